/// table keyed directly by a random 36-char uuid string
pub const UUID_TABLE: &str = "test_100m_table";
/// table keyed by the composite `(crc32(uuid), uuid)`
pub const CRC32_TABLE: &str = "test_100m_crc32_table";
/// table keyed by a generated numeric snowflake id
pub const SNOWFLAKE_TABLE: &str = "test_snowflake_table";

/// checksum half of the composite key: CRC-32/IEEE over the uuid bytes
pub fn uuid_checksum(uuid: &str) -> u32 {
    crc32fast::hash(uuid.as_bytes())
}

/// row in `test_100m_table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UuidRecord {
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub nickname: String,
}

/// row in `test_100m_crc32_table`; `uuid_crc32` is always derived from `uuid`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crc32Record {
    pub uuid_crc32: u32,
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub nickname: String,
}

impl Crc32Record {
    /// builds a record with its checksum column filled in
    pub fn new(uuid: String, name: String, email: String, nickname: String) -> Self {
        let uuid_crc32 = uuid_checksum(&uuid);
        Self {
            uuid_crc32,
            uuid,
            name,
            email,
            nickname,
        }
    }
}

/// row in `test_snowflake_table`; an `id` of 0 means "assign one on insert"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnowflakeRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub nickname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_the_ieee_polynomial() {
        // classic CRC-32 check value
        assert_eq!(uuid_checksum("123456789"), 0xCBF4_3926);
    }

    #[test]
    fn checksum_distinguishes_close_uuids() {
        let a = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        let b = "6ba7b810-9dad-11d1-80b4-00c04fd430c9";
        assert_eq!(uuid_checksum(a), uuid_checksum(a));
        assert_ne!(uuid_checksum(a), uuid_checksum(b));
    }

    #[test]
    fn crc32_record_derives_its_key_column() {
        let record = Crc32Record::new(
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_string(),
            "Name_1".to_string(),
            "email_1@test.com".to_string(),
            "Nickname_1".to_string(),
        );
        assert_eq!(record.uuid_crc32, uuid_checksum(&record.uuid));
    }
}
