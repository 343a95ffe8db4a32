mod crc32;
mod snowflake;
mod uuid;

pub use self::crc32::Crc32Dal;
pub use self::snowflake::SnowflakeDal;
pub use self::uuid::UuidDal;

/// builds the `(?, ?, ...), (?, ?, ...)` placeholder list for a multi-row insert
pub(crate) fn batch_placeholders(columns: usize, rows: usize) -> String {
    let group = format!("({})", vec!["?"; columns].join(", "));
    vec![group; rows].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_for_a_single_row() {
        assert_eq!(batch_placeholders(4, 1), "(?, ?, ?, ?)");
    }

    #[test]
    fn placeholders_for_many_rows() {
        assert_eq!(batch_placeholders(2, 3), "(?, ?), (?, ?), (?, ?)");
    }
}
