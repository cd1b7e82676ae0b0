use std::path::PathBuf;

use crate::error::SortError;
use crate::merge::Passes;

pub const DEFAULT_MEMORY_BUDGET: usize = 64 * 1024 * 1024;
pub const DEFAULT_WRITE_CACHE_SIZE: usize = 8192;
pub const DEFAULT_RANDOM_ACCESS_CACHES: usize = 16;
pub const DEFAULT_TMP_PREFIX: &str = "table-file-sort-";

/// Settings of one sort run.
///
/// # Examples
/// ```
/// use table_file_sort::config::Config;
/// use table_file_sort::merge::Passes;
/// let config = Config::new(1024 * 1024)
///     .with_write_cache_size(4096)
///     .with_passes(Passes::Single);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    memory_budget: usize,
    write_cache_size: usize,
    random_access_caches: usize,
    batch_rows: Option<usize>,
    passes: Passes,
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_MEMORY_BUDGET)
    }
}

impl Config {
    /// Configuration with the given memory budget in bytes, intermediate files go to
    /// std::env::temp_dir()
    pub fn new(memory_budget: usize) -> Config {
        Config {
            tmp: std::env::temp_dir(),
            tmp_prefix: DEFAULT_TMP_PREFIX.to_string(),
            memory_budget,
            write_cache_size: DEFAULT_WRITE_CACHE_SIZE,
            random_access_caches: DEFAULT_RANDOM_ACCESS_CACHES,
            batch_rows: None,
            passes: Passes::Auto,
        }
    }

    pub fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub fn memory_budget(&self) -> usize {
        self.memory_budget
    }

    pub fn write_cache_size(&self) -> usize {
        self.write_cache_size
    }

    pub fn random_access_caches(&self) -> usize {
        self.random_access_caches
    }

    pub fn passes(&self) -> Passes {
        self.passes
    }

    /// Rows per pre-sorted batch, by default as many records as fit the memory budget
    pub fn batch_rows(&self, record_length: usize) -> Result<usize, SortError> {
        let batch_rows = match self.batch_rows {
            Some(batch_rows) => batch_rows,
            None => self.memory_budget / record_length.max(1),
        };
        if batch_rows == 0 {
            Err(
                SortError::Configuration(
                    format!("memory budget of {} bytes cannot hold a record of {} bytes", self.memory_budget, record_length)
                )
            )
        } else {
            Ok(batch_rows)
        }
    }

    pub fn with_tmp(mut self, tmp: PathBuf) -> Config {
        self.tmp = tmp;
        self
    }

    pub fn with_tmp_prefix(mut self, tmp_prefix: &str) -> Config {
        self.tmp_prefix = tmp_prefix.to_string();
        self
    }

    pub fn with_memory_budget(mut self, memory_budget: usize) -> Config {
        self.memory_budget = memory_budget;
        self
    }

    pub fn with_write_cache_size(mut self, write_cache_size: usize) -> Config {
        self.write_cache_size = write_cache_size;
        self
    }

    pub fn with_random_access_caches(mut self, random_access_caches: usize) -> Config {
        self.random_access_caches = random_access_caches;
        self
    }

    pub fn with_batch_rows(mut self, batch_rows: usize) -> Config {
        self.batch_rows = Some(batch_rows);
        self
    }

    pub fn with_passes(mut self, passes: Passes) -> Config {
        self.passes = passes;
        self
    }

    /// Reject settings that cannot work before any file is touched
    pub fn validate(&self) -> Result<(), SortError> {
        if self.write_cache_size == 0 {
            return Err(SortError::Configuration("write cache size must be positive".to_string()));
        }
        if self.memory_budget < self.write_cache_size {
            return Err(
                SortError::Configuration(
                    format!("memory budget {} is smaller than the write cache {}", self.memory_budget, self.write_cache_size)
                )
            );
        }
        if self.random_access_caches == 0 {
            return Err(SortError::Configuration("random access cache count must be positive".to_string()));
        }
        if self.batch_rows == Some(0) {
            return Err(SortError::Configuration("batch rows must be positive".to_string()));
        }
        if let Passes::Double { k1: Some(0) } = self.passes {
            return Err(SortError::Configuration("regions per first pass group must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::SortError;
    use crate::merge::Passes;

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());
        assert!(matches!(Config::new(100).validate(), Err(SortError::Configuration(_))));
        assert!(matches!(Config::default().with_random_access_caches(0).validate(), Err(SortError::Configuration(_))));
        assert!(matches!(Config::default().with_batch_rows(0).validate(), Err(SortError::Configuration(_))));
        assert!(matches!(
            Config::default().with_passes(Passes::Double { k1: Some(0) }).validate(),
            Err(SortError::Configuration(_))
        ));
    }

    #[test]
    fn test_batch_rows() -> Result<(), anyhow::Error> {
        let config = Config::new(1000).with_write_cache_size(10);
        assert_eq!(config.batch_rows(7)?, 142);
        assert_eq!(config.clone().with_batch_rows(3).batch_rows(7)?, 3);
        assert!(matches!(config.batch_rows(1001), Err(SortError::Configuration(_))));
        Ok(())
    }
}
