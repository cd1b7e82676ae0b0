/// Field type used when comparing text values of a sort key field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// String, compared by code points
    String,
    /// Signed 64 bit integer
    Integer,
    /// Arbitrary precision integer
    BigInteger,
}
