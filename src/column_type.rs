use crate::error::SortError;

/// Largest supported width of a [ColumnType::FixedBigInt] value in bytes.
pub const MAX_BIG_INT_WIDTH: usize = 256;

/// Charset used to store [ColumnType::FixedString] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    /// 7 bit US-ASCII
    UsAscii,
    /// ISO-8859-1, every char below U+0100 maps to the byte of the same value
    Latin1,
    /// DOS Latin 1 code page, ASCII plus western European letters
    Ibm850,
    /// DOS Cyrillic code page, ASCII plus Russian letters
    Ibm866,
    /// UTF-8, named for completeness, cannot be used for fixed width columns
    Utf8,
}

impl Charset {
    /// Resolve a charset by one of its common names, case insensitive.
    pub fn from_name(name: &str) -> Result<Charset, SortError> {
        match name.to_ascii_uppercase().as_str() {
            "US-ASCII" | "ASCII" => Ok(Charset::UsAscii),
            "ISO-8859-1" | "LATIN1" | "LATIN-1" => Ok(Charset::Latin1),
            "IBM850" | "CP850" | "IBM-850" => Ok(Charset::Ibm850),
            "IBM866" | "CP866" | "IBM-866" => Ok(Charset::Ibm866),
            "UTF-8" | "UTF8" => Ok(Charset::Utf8),
            _ => Err(SortError::Configuration(format!("unknown charset {name}"))),
        }
    }

    /// Number of bytes per char when every char takes the same number of bytes.
    pub fn bytes_per_char(&self) -> Option<usize> {
        match self {
            Charset::UsAscii | Charset::Latin1 | Charset::Ibm850 | Charset::Ibm866 => Some(1),
            Charset::Utf8 => None,
        }
    }

    pub(crate) fn encode_char(&self, c: char) -> u8 {
        if c.is_ascii() {
            return c as u8;
        }
        let high = match self {
            Charset::Latin1 if (c as u32) < 0x100 => Some(c as u32 as u8),
            Charset::Ibm850 => code_page_byte(&IBM850_HIGH, c),
            Charset::Ibm866 => code_page_byte(&IBM866_HIGH, c),
            _ => None,
        };
        high.unwrap_or(b'?')
    }

    pub(crate) fn decode_byte(&self, b: u8) -> char {
        if b.is_ascii() {
            return b as char;
        }
        match self {
            Charset::Latin1 => b as char,
            Charset::Ibm850 => IBM850_HIGH[(b - 0x80) as usize],
            Charset::Ibm866 => IBM866_HIGH[(b - 0x80) as usize],
            _ => char::REPLACEMENT_CHARACTER,
        }
    }
}

fn code_page_byte(high: &[char; 128], c: char) -> Option<u8> {
    high.iter().position(|h| *h == c).map(|i| 0x80 + i as u8)
}

/// Chars of the bytes 0x80..=0xFF of code page 850
const IBM850_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐',
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤',
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀',
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´',
    '\u{ad}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{a0}',
];

/// Chars of the bytes 0x80..=0xFF of code page 866
const IBM866_HIGH: [char; 128] = [
    'А', 'Б', 'В', 'Г', 'Д', 'Е', 'Ж', 'З', 'И', 'Й', 'К', 'Л', 'М', 'Н', 'О', 'П',
    'Р', 'С', 'Т', 'У', 'Ф', 'Х', 'Ц', 'Ч', 'Ш', 'Щ', 'Ъ', 'Ы', 'Ь', 'Э', 'Ю', 'Я',
    'а', 'б', 'в', 'г', 'д', 'е', 'ж', 'з', 'и', 'й', 'к', 'л', 'м', 'н', 'о', 'п',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'р', 'с', 'т', 'у', 'ф', 'х', 'ц', 'ч', 'ш', 'щ', 'ъ', 'ы', 'ь', 'э', 'ю', 'я',
    'Ё', 'ё', 'Є', 'є', 'Ї', 'ї', 'Ў', 'ў', '°', '∙', '·', '√', '№', '¤', '■', '\u{a0}',
];

/// Fixed width binary encoding of a column.
///
/// # Examples
/// ```
/// use table_file_sort::column_type::{Charset, ColumnType};
/// let id = ColumnType::FixedInt64;
/// let amount = ColumnType::fixed_big_int(16).unwrap();
/// let name = ColumnType::fixed_string(12, Charset::UsAscii).unwrap();
/// assert_eq!(id.width() + amount.width() + name.width(), 8 + 17 + 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Signed 32 bit integer, big endian
    FixedInt32,
    /// Signed 64 bit integer, big endian
    FixedInt64,
    /// Arbitrary precision integer with at most `byte_width` bytes of two's complement
    FixedBigInt {
        byte_width: usize
    },
    /// String of at most `char_width` chars in a single byte charset
    FixedString {
        char_width: usize,
        charset: Charset,
    },
}

impl ColumnType {
    /// Create a big integer column. Widths of 0 or above [MAX_BIG_INT_WIDTH] are rejected.
    pub fn fixed_big_int(byte_width: usize) -> Result<ColumnType, SortError> {
        if byte_width == 0 || byte_width > MAX_BIG_INT_WIDTH {
            return Err(SortError::Configuration(
                format!("big integer width must be within 1..={MAX_BIG_INT_WIDTH}, got {byte_width}")
            ));
        }
        Ok(ColumnType::FixedBigInt { byte_width })
    }

    /// Create a string column. Only charsets with one byte per char are supported.
    pub fn fixed_string(char_width: usize, charset: Charset) -> Result<ColumnType, SortError> {
        if charset.bytes_per_char() != Some(1) {
            return Err(SortError::Configuration(format!("unsupported charset {charset:?}")));
        }
        if char_width == 0 {
            return Err(SortError::Configuration("string width must be positive".to_string()));
        }
        Ok(ColumnType::FixedString { char_width, charset })
    }

    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        match self {
            ColumnType::FixedInt32 => 4,
            ColumnType::FixedInt64 => 8,
            // extra leading byte holds the true length, see codec
            ColumnType::FixedBigInt { byte_width } => byte_width + 1,
            ColumnType::FixedString { char_width, charset } => {
                char_width * charset.bytes_per_char().unwrap_or(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::column_type::{Charset, ColumnType};
    use crate::error::SortError;

    #[test]
    fn test_widths() -> Result<(), anyhow::Error> {
        assert_eq!(ColumnType::FixedInt32.width(), 4);
        assert_eq!(ColumnType::FixedInt64.width(), 8);
        assert_eq!(ColumnType::fixed_big_int(16)?.width(), 17);
        assert_eq!(ColumnType::fixed_string(5, Charset::Latin1)?.width(), 5);
        Ok(())
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(ColumnType::fixed_big_int(257), Err(SortError::Configuration(_))));
        assert!(matches!(ColumnType::fixed_big_int(0), Err(SortError::Configuration(_))));
        assert!(matches!(ColumnType::fixed_string(4, Charset::Utf8), Err(SortError::Configuration(_))));
        assert!(matches!(Charset::from_name("KOI8-R"), Err(SortError::Configuration(_))));
    }

    #[test]
    fn test_charset_names() -> Result<(), anyhow::Error> {
        assert_eq!(Charset::from_name("us-ascii")?, Charset::UsAscii);
        assert_eq!(Charset::from_name("ISO-8859-1")?, Charset::Latin1);
        assert_eq!(Charset::from_name("utf-8")?, Charset::Utf8);
        assert_eq!(Charset::from_name("Cp850")?, Charset::Ibm850);
        assert_eq!(Charset::from_name("IBM866")?, Charset::Ibm866);
        Ok(())
    }

    #[test]
    fn test_code_pages() {
        for charset in [Charset::Ibm850, Charset::Ibm866] {
            for b in 0..=255u8 {
                assert_eq!(charset.encode_char(charset.decode_byte(b)), b, "{:?} byte {}", charset, b);
            }
        }
        assert_eq!(Charset::Ibm866.encode_char('Ж'), 0x86);
        assert_eq!(Charset::Ibm866.encode_char('я'), 0xef);
        assert_eq!(Charset::Ibm850.encode_char('é'), 0x82);
        assert_eq!(Charset::Ibm850.encode_char('Ж'), b'?');
        assert_eq!(Charset::UsAscii.encode_char('é'), b'?');
        assert_eq!(Charset::UsAscii.decode_byte(0x82), char::REPLACEMENT_CHARACTER);
    }
}
