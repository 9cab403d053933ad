//! Splits a curl command line into flag/value pairs and positional words.
//!
//! Only the quoting a curl user typically writes is understood: `'...'`,
//! `"..."`, backslash escapes and `$'...'` for data values. Anything else is
//! passed through as-is.

use crate::curl::flags::CurlFlag;

/// One word of the command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Flag {
        /// Spelling used on the command line, without an attached value
        name: String,
        flag: Option<CurlFlag>,
        value: Option<String>,
    },
    Positional {
        text: String,
        /// Started with a quote character
        quoted: bool,
    },
}

/// Tokenizer output
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
}

impl Tokenized {
    /// Recognized flags with their values, in command-line order
    pub fn flags(&self) -> impl Iterator<Item = (CurlFlag, &str)> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Flag {
                flag: Some(flag),
                value,
                ..
            } => Some((*flag, value.as_deref().unwrap_or_default())),
            _ => None,
        })
    }

    /// Positional words
    pub fn positionals(&self) -> impl Iterator<Item = (&str, bool)> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Positional { text, quoted } => Some((text.as_str(), *quoted)),
            Token::Flag { .. } => None,
        })
    }

    /// Positional words joined by single spaces
    pub fn residual(&self) -> String {
        self.positionals()
            .map(|(text, _)| text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Tokenize a curl command
pub fn tokenize(input: &str) -> Tokenized {
    let normalized = input.replace("\\\r\n", " ").replace("\\\n", " ");
    let mut scanner = Scanner::new(&normalized);
    let mut tokens = Vec::new();

    loop {
        scanner.skip_whitespace();
        let Some(c) = scanner.peek() else { break };

        if c == '-' && scanner.peek_at(1).is_some_and(|n| !n.is_whitespace()) {
            if scanner.peek_at(1) == Some('-') {
                tokens.push(scanner.read_long_flag());
            } else {
                scanner.read_short_flags(&mut tokens);
            }
        } else {
            let quoted = matches!(c, '\'' | '"');
            let text = scanner.read_word(false);
            tokens.push(Token::Positional { text, quoted });
        }
    }

    if let Some(Token::Positional { text, .. }) = tokens.first() {
        if text.eq_ignore_ascii_case("curl") {
            tokens.remove(0);
        }
    }

    Tokenized { tokens }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Scanner {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// `--name`, `--name=value` or `--name value`
    fn read_long_flag(&mut self) -> Token {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            name.push(c);
            self.pos += 1;
        }

        match CurlFlag::lookup(&name) {
            Some(flag) if flag.takes_value() => {
                let value = if self.peek() == Some('=') {
                    self.pos += 1;
                    Some(self.read_word(flag.is_data()))
                } else {
                    self.read_separate_value(flag)
                };
                Token::Flag {
                    name,
                    flag: Some(flag),
                    value,
                }
            }
            flag => {
                let rest = self.read_word(false);
                let flag = if rest.is_empty() { flag } else { None };
                name.push_str(&rest);
                Token::Flag {
                    name,
                    flag,
                    value: None,
                }
            }
        }
    }

    /// `-X PUT`, `-XPUT` and clusters such as `-sLX PUT`. Letters before the
    /// first value-taking option become value-less flags.
    fn read_short_flags(&mut self, tokens: &mut Vec<Token>) {
        self.pos += 1;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            self.pos += 1;
            let name = format!("-{}", c);
            match CurlFlag::lookup(&name) {
                Some(flag) if flag.takes_value() => {
                    let value = if self.peek().is_some_and(|n| !n.is_whitespace()) {
                        Some(self.read_word(flag.is_data()))
                    } else {
                        self.read_separate_value(flag)
                    };
                    tokens.push(Token::Flag {
                        name,
                        flag: Some(flag),
                        value,
                    });
                    return;
                }
                flag => tokens.push(Token::Flag {
                    name,
                    flag,
                    value: None,
                }),
            }
        }
    }

    fn read_separate_value(&mut self, flag: CurlFlag) -> Option<String> {
        self.skip_whitespace();
        self.peek().map(|_| self.read_word(flag.is_data()))
    }

    /// Read one shell word, concatenating adjacent quoted and bare segments
    fn read_word(&mut self, allow_ansi_c: bool) -> String {
        let mut out = String::new();

        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => break,
                '\'' => {
                    self.pos += 1;
                    self.read_single_quoted(&mut out);
                }
                '"' => {
                    self.pos += 1;
                    self.read_double_quoted(&mut out);
                }
                '$' if allow_ansi_c && self.peek_at(1) == Some('\'') => {
                    self.pos += 2;
                    self.read_ansi_c_quoted(&mut out);
                }
                '\\' => {
                    self.pos += 1;
                    out.push(self.bump().unwrap_or('\\'));
                }
                _ => {
                    self.pos += 1;
                    out.push(c);
                }
            }
        }

        out
    }

    fn read_single_quoted(&mut self, out: &mut String) {
        while let Some(c) = self.bump() {
            if c == '\'' {
                return;
            }
            out.push(c);
        }
    }

    fn read_double_quoted(&mut self, out: &mut String) {
        while let Some(c) = self.bump() {
            match c {
                '"' => return,
                '\\' => match self.peek() {
                    Some(next @ ('"' | '\\')) => {
                        self.pos += 1;
                        out.push(next);
                    }
                    _ => out.push('\\'),
                },
                _ => out.push(c),
            }
        }
    }

    fn read_ansi_c_quoted(&mut self, out: &mut String) {
        while let Some(c) = self.bump() {
            match c {
                '\'' => return,
                '\\' => match self.bump() {
                    Some('\'') => out.push('\''),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                _ => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(name: &str, flag: CurlFlag, value: &str) -> Token {
        Token::Flag {
            name: name.to_string(),
            flag: Some(flag),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn strips_leading_curl_case_insensitively() {
        let tokenized = tokenize("CURL https://example.com");
        assert_eq!(
            tokenized.tokens,
            vec![Token::Positional {
                text: "https://example.com".into(),
                quoted: false
            }]
        );
    }

    #[test]
    fn reads_quoted_values() {
        let tokenized = tokenize(r#"curl -H "Accept: a b" -H 'X-Id: 7' https://x"#);
        assert_eq!(tokenized.tokens[0], flag("-H", CurlFlag::Header, "Accept: a b"));
        assert_eq!(tokenized.tokens[1], flag("-H", CurlFlag::Header, "X-Id: 7"));
        assert_eq!(tokenized.residual(), "https://x");
    }

    #[test]
    fn double_quotes_only_unescape_quote_and_backslash() {
        let tokenized = tokenize(r#"curl -d "{\"a\":\"x\ny\\\\\"}" https://x"#);
        let (_, value) = tokenized.flags().next().unwrap();
        assert_eq!(value, r#"{"a":"x\ny\\"}"#);
    }

    #[test]
    fn ansi_c_quoting_for_data_flags() {
        let tokenized = tokenize(r"curl --data-raw $'{\'a\':\'b\'}\n\x' https://x");
        let (flag, value) = tokenized.flags().next().unwrap();
        assert_eq!(flag, CurlFlag::DataRaw);
        assert_eq!(value, "{'a':'b'}\n\\x");
    }

    #[test]
    fn ansi_c_quoting_is_literal_elsewhere() {
        let tokenized = tokenize(r"curl -H $'X: 1' https://x");
        let (_, value) = tokenized.flags().next().unwrap();
        assert_eq!(value, "$X: 1");
    }

    #[test]
    fn escaped_newlines_and_adjacent_segments() {
        let tokenized = tokenize("curl 'https://x' \\\n  -d 'it'\\''s' \\\r\n --compressed");
        let flags: Vec<_> = tokenized.flags().collect();
        assert_eq!(flags, vec![(CurlFlag::Data, "it's"), (CurlFlag::Compressed, "")]);
        assert_eq!(tokenized.positionals().next(), Some(("https://x", true)));
    }

    #[test]
    fn attached_values() {
        let tokenized = tokenize("curl -XPUT --header=Accept:json --url=https://x -sSL");
        assert_eq!(tokenized.tokens[0], flag("-X", CurlFlag::Request, "PUT"));
        assert_eq!(tokenized.tokens[1], flag("--header", CurlFlag::Header, "Accept:json"));
        assert_eq!(tokenized.tokens[2], flag("--url", CurlFlag::Url, "https://x"));
        let names: Vec<_> = tokenized.tokens[3..]
            .iter()
            .map(|token| match token {
                Token::Flag { name, flag, value } => {
                    assert_eq!((flag, value), (&None, &None));
                    name.as_str()
                }
                Token::Positional { .. } => panic!("unexpected positional"),
            })
            .collect();
        assert_eq!(names, vec!["-s", "-S", "-L"]);
    }

    #[test]
    fn short_option_cluster_ending_in_value_flag() {
        let tokenized = tokenize("curl -sLX PUT -kd'a=1' https://x");
        let flags: Vec<_> = tokenized.flags().collect();
        assert_eq!(flags, vec![(CurlFlag::Request, "PUT"), (CurlFlag::Data, "a=1")]);
        assert_eq!(tokenized.residual(), "https://x");
    }

    #[test]
    fn attached_data_values_accept_ansi_c_quoting() {
        let tokenized = tokenize(r"curl --data=$'a\nb' -d$'c\td' https://x");
        let flags: Vec<_> = tokenized.flags().collect();
        assert_eq!(flags, vec![(CurlFlag::Data, "a\nb"), (CurlFlag::Data, "c\td")]);
    }

    #[test]
    fn unknown_long_flag_keeps_its_attached_text() {
        let tokenized = tokenize("curl --retry-delay=3 --compressed=yes https://x");
        assert_eq!(tokenized.flags().count(), 0);
        assert_eq!(tokenized.residual(), "https://x");
    }

    #[test]
    fn unknown_flags_do_not_swallow_values_but_known_ignored_ones_do() {
        let tokenized = tokenize("curl --insecure -o out.json https://x");
        assert_eq!(tokenized.residual(), "https://x");
    }

    #[test]
    fn unterminated_quote_reads_to_end() {
        let tokenized = tokenize("curl -d 'abc https://x");
        let (_, value) = tokenized.flags().next().unwrap();
        assert_eq!(value, "abc https://x");
        assert_eq!(tokenized.residual(), "");
    }
}
