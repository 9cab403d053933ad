//! The curl options the interpreter knows about

/// Canonical curl option, independent of the spelling used on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurlFlag {
    Request,
    Header,
    /// `-d` and friends; a bare `@path` names a file
    Data,
    /// `--data-raw`; `@` has no special meaning
    DataRaw,
    DataUrlEncode,
    Form,
    Url,
    User,
    Cookie,
    UserAgent,
    Compressed,
    /// Recognized but irrelevant option that consumes a value
    IgnoredWithValue,
}

const FLAG_TABLE: &[(&str, CurlFlag)] = &[
    ("-X", CurlFlag::Request),
    ("--request", CurlFlag::Request),
    ("-H", CurlFlag::Header),
    ("--header", CurlFlag::Header),
    ("-d", CurlFlag::Data),
    ("--data", CurlFlag::Data),
    ("--data-binary", CurlFlag::Data),
    ("--data-ascii", CurlFlag::Data),
    ("--data-raw", CurlFlag::DataRaw),
    ("--data-urlencode", CurlFlag::DataUrlEncode),
    ("-F", CurlFlag::Form),
    ("--form", CurlFlag::Form),
    ("--url", CurlFlag::Url),
    ("-u", CurlFlag::User),
    ("--user", CurlFlag::User),
    ("-b", CurlFlag::Cookie),
    ("--cookie", CurlFlag::Cookie),
    ("-A", CurlFlag::UserAgent),
    ("--user-agent", CurlFlag::UserAgent),
    ("--compressed", CurlFlag::Compressed),
    ("-o", CurlFlag::IgnoredWithValue),
    ("--output", CurlFlag::IgnoredWithValue),
    ("-e", CurlFlag::IgnoredWithValue),
    ("--referer", CurlFlag::IgnoredWithValue),
    ("-x", CurlFlag::IgnoredWithValue),
    ("--proxy", CurlFlag::IgnoredWithValue),
    ("-m", CurlFlag::IgnoredWithValue),
    ("--max-time", CurlFlag::IgnoredWithValue),
    ("--connect-timeout", CurlFlag::IgnoredWithValue),
    ("-w", CurlFlag::IgnoredWithValue),
    ("--write-out", CurlFlag::IgnoredWithValue),
    ("-c", CurlFlag::IgnoredWithValue),
    ("--cookie-jar", CurlFlag::IgnoredWithValue),
    ("-T", CurlFlag::IgnoredWithValue),
    ("--upload-file", CurlFlag::IgnoredWithValue),
    ("-E", CurlFlag::IgnoredWithValue),
    ("--cert", CurlFlag::IgnoredWithValue),
    ("--key", CurlFlag::IgnoredWithValue),
    ("--cacert", CurlFlag::IgnoredWithValue),
    ("--resolve", CurlFlag::IgnoredWithValue),
    ("--retry", CurlFlag::IgnoredWithValue),
];

impl CurlFlag {
    /// Look up an option by the exact spelling used on the command line
    pub fn lookup(name: &str) -> Option<CurlFlag> {
        FLAG_TABLE
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .map(|(_, flag)| *flag)
    }

    pub fn takes_value(self) -> bool {
        !matches!(self, CurlFlag::Compressed)
    }

    /// Data options accept the `$'...'` quoting form
    pub fn is_data(self) -> bool {
        matches!(self, CurlFlag::Data | CurlFlag::DataRaw | CurlFlag::DataUrlEncode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_spellings_share_a_flag() {
        assert_eq!(CurlFlag::lookup("-H"), CurlFlag::lookup("--header"));
        assert_eq!(CurlFlag::lookup("--data-binary"), Some(CurlFlag::Data));
        assert_eq!(CurlFlag::lookup("--data-raw"), Some(CurlFlag::DataRaw));
        assert_eq!(CurlFlag::lookup("--insecure"), None);
    }

    #[test]
    fn only_compressed_is_valueless() {
        assert!(!CurlFlag::Compressed.takes_value());
        assert!(CurlFlag::IgnoredWithValue.takes_value());
        assert!(CurlFlag::DataUrlEncode.is_data());
        assert!(!CurlFlag::Form.is_data());
    }
}
