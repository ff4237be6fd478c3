//! The CTCP commands clients commonly exchange.

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Local, TimeZone};

use super::{CtcpKind, CtcpPayload};
use crate::error::MessageParseError;
use crate::validation::ValidationError;

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// A request whose data, if any, is ignored.
macro_rules! bare_request {
    ($(#[$doc:meta])* $name:ident, $command:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
        pub struct $name;

        impl CtcpPayload for $name {
            const COMMAND: &'static str = $command;
            const KIND: CtcpKind = CtcpKind::Request;

            fn parse(_data: Option<&str>) -> Result<Self, MessageParseError> {
                Ok($name)
            }

            fn data(&self) -> Option<String> {
                None
            }
        }
    };
}

/// A payload carrying one free-text field.
macro_rules! text_payload {
    ($(#[$doc:meta])* $name:ident, $command:literal, $kind:ident, $field:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Default)]
        pub struct $name {
            pub $field: String,
        }

        impl $name {
            pub fn new($field: impl Into<String>) -> Self {
                $name {
                    $field: $field.into(),
                }
            }
        }

        impl CtcpPayload for $name {
            const COMMAND: &'static str = $command;
            const KIND: CtcpKind = CtcpKind::$kind;

            fn parse(data: Option<&str>) -> Result<Self, MessageParseError> {
                Ok($name {
                    $field: data.unwrap_or_default().to_string(),
                })
            }

            fn data(&self) -> Option<String> {
                non_empty(&self.$field)
            }
        }
    };
}

text_payload! {
    /// `ACTION text`, the `/me` emote.
    Action, "ACTION", Request, text
}

bare_request! {
    /// `VERSION`
    Version, "VERSION"
}
text_payload! {
    /// `VERSION client-info`
    VersionReply, "VERSION", Reply, info
}

text_payload! {
    /// `PING token`. The token is echoed back unchanged.
    Ping, "PING", Request, token
}
text_payload! {
    PingReply, "PING", Reply, token
}

impl Ping {
    pub fn reply(&self) -> PingReply {
        PingReply {
            token: self.token.clone(),
        }
    }
}

bare_request! {
    /// `TIME`
    Time, "TIME"
}
text_payload! {
    /// `TIME human-readable-time`
    TimeReply, "TIME", Reply, time
}

impl TimeReply {
    /// The local time in `ctime` layout.
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        TimeReply {
            time: time.format("%a %b %e %H:%M:%S %Y").to_string(),
        }
    }
}

/// `CLIENTINFO [command]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClientInfo {
    pub query: Option<String>,
}

impl CtcpPayload for ClientInfo {
    const COMMAND: &'static str = "CLIENTINFO";
    const KIND: CtcpKind = CtcpKind::Request;

    fn parse(data: Option<&str>) -> Result<Self, MessageParseError> {
        Ok(ClientInfo {
            query: data.and_then(non_empty),
        })
    }

    fn data(&self) -> Option<String> {
        self.query.clone()
    }
}

/// `CLIENTINFO command ...`, listing the CTCP commands a client answers.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClientInfoReply {
    pub commands: Vec<String>,
}

impl CtcpPayload for ClientInfoReply {
    const COMMAND: &'static str = "CLIENTINFO";
    const KIND: CtcpKind = CtcpKind::Reply;

    fn parse(data: Option<&str>) -> Result<Self, MessageParseError> {
        Ok(ClientInfoReply {
            commands: data
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        })
    }

    fn data(&self) -> Option<String> {
        non_empty(&self.commands.join(" "))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.commands.iter().any(|c| c.is_empty() || c.contains(' ')) {
            return Err(ValidationError::Empty);
        }
        Ok(())
    }
}

bare_request! {
    /// `USERINFO`
    UserInfo, "USERINFO"
}
text_payload! {
    UserInfoReply, "USERINFO", Reply, info
}
bare_request! {
    /// `FINGER`
    Finger, "FINGER"
}
text_payload! {
    FingerReply, "FINGER", Reply, info
}
bare_request! {
    /// `SOURCE`
    Source, "SOURCE"
}
text_payload! {
    /// `SOURCE where-to-get-the-client`
    SourceReply, "SOURCE", Reply, info
}

text_payload! {
    /// `ERRMSG query`. Answered with the query and an error description.
    ErrMsg, "ERRMSG", Request, query
}

/// `ERRMSG query :error`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ErrMsgReply {
    pub query: String,
    pub error: String,
}

impl CtcpPayload for ErrMsgReply {
    const COMMAND: &'static str = "ERRMSG";
    const KIND: CtcpKind = CtcpKind::Reply;

    fn parse(data: Option<&str>) -> Result<Self, MessageParseError> {
        let data = data.unwrap_or_default();
        let (query, error) = data.split_once(" :").unwrap_or((data, ""));
        Ok(ErrMsgReply {
            query: query.to_string(),
            error: error.to_string(),
        })
    }

    fn data(&self) -> Option<String> {
        if self.error.is_empty() {
            non_empty(&self.query)
        } else {
            Some(format!("{} :{}", self.query, self.error))
        }
    }
}

text_payload! {
    /// `PAGE [text]`, a request for attention.
    Page, "PAGE", Request, text
}

/// `DCC type argument address port [extra...]`
///
/// The argument is a filename for `SEND` and a protocol name for `CHAT`;
/// names containing spaces travel in double quotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dcc {
    pub kind: String,
    pub argument: String,
    /// A decimal IPv4 address or an IPv6 literal.
    pub address: String,
    pub port: u16,
    /// Trailing fields such as the file size or a passive token.
    pub extra: Vec<String>,
}

impl Dcc {
    /// The peer address, decoding the decimal IPv4 form.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self.address.parse::<u32>() {
            Ok(decimal) => Some(IpAddr::V4(Ipv4Addr::from(decimal))),
            Err(_) => self.address.parse().ok(),
        }
    }

    /// The file size of a `SEND` offer.
    pub fn size(&self) -> Option<u64> {
        if !self.kind.eq_ignore_ascii_case("SEND") {
            return None;
        }
        self.extra.first().and_then(|s| s.parse().ok())
    }
}

impl CtcpPayload for Dcc {
    const COMMAND: &'static str = "DCC";
    const KIND: CtcpKind = CtcpKind::Request;

    fn parse(data: Option<&str>) -> Result<Self, MessageParseError> {
        let invalid = || MessageParseError::InvalidCtcp(format!("bad DCC request {:?}", data));
        let data = data.ok_or_else(invalid)?;
        let (kind, rest) = data.split_once(' ').ok_or_else(invalid)?;

        let (argument, rest) = match rest.strip_prefix('"') {
            Some(quoted) => {
                let (name, rest) = quoted.split_once('"').ok_or_else(invalid)?;
                (name, rest.trim_start())
            }
            None => rest.split_once(' ').ok_or_else(invalid)?,
        };

        let mut fields = rest.split_whitespace();
        let address = fields.next().ok_or_else(invalid)?;
        let port = fields
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;

        Ok(Dcc {
            kind: kind.to_string(),
            argument: argument.to_string(),
            address: address.to_string(),
            port,
            extra: fields.map(str::to_string).collect(),
        })
    }

    fn data(&self) -> Option<String> {
        let argument = if self.argument.contains(' ') {
            format!("\"{}\"", self.argument)
        } else {
            self.argument.clone()
        };
        let mut data = format!("{} {} {} {}", self.kind, argument, self.address, self.port);
        for field in &self.extra {
            data.push(' ');
            data.push_str(field);
        }
        Some(data)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.kind.is_empty() || self.argument.is_empty() || self.address.is_empty() {
            return Err(ValidationError::Empty);
        }
        if let Some((position, ch)) = self.kind.char_indices().find(|(_, c)| *c == ' ') {
            return Err(ValidationError::InvalidChar { ch, position });
        }
        if self.argument.contains('"') {
            return Err(ValidationError::InvalidChar {
                ch: '"',
                position: self.argument.find('"').unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn empty_text_has_no_data() {
        assert_eq!(Action::parse(None).unwrap().data(), None);
        assert_eq!(VersionReply::new("nebo 1.0").data().as_deref(), Some("nebo 1.0"));
    }

    #[test]
    fn ping_reply_echoes_token() {
        let ping = Ping::parse(Some("1700000000 123")).unwrap();
        assert_eq!(ping.reply().token, "1700000000 123");
    }

    #[test]
    fn time_reply_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(TimeReply::at(&at).time, "Tue Mar  5 07:08:09 2024");
    }

    #[test]
    fn errmsg_reply_split() {
        let reply = ErrMsgReply::parse(Some("FOO :unknown query")).unwrap();
        assert_eq!(reply.query, "FOO");
        assert_eq!(reply.error, "unknown query");
        assert_eq!(reply.data().as_deref(), Some("FOO :unknown query"));
    }

    #[test]
    fn dcc_send_offer() {
        let dcc = Dcc::parse(Some("SEND notes.txt 3232235777 5000 1024")).unwrap();
        assert_eq!(dcc.kind, "SEND");
        assert_eq!(dcc.argument, "notes.txt");
        assert_eq!(dcc.port, 5000);
        assert_eq!(dcc.size(), Some(1024));
        assert_eq!(dcc.ip_addr(), Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
    }

    #[test]
    fn dcc_quoted_filename() {
        let dcc = Dcc::parse(Some("SEND \"my file.txt\" 2130706433 5000 10")).unwrap();
        assert_eq!(dcc.argument, "my file.txt");
        assert_eq!(dcc.data().as_deref(), Some("SEND \"my file.txt\" 2130706433 5000 10"));
    }

    #[test]
    fn dcc_rejects_garbage() {
        assert!(Dcc::parse(None).is_err());
        assert!(Dcc::parse(Some("SEND file")).is_err());
        assert!(Dcc::parse(Some("SEND file 1 notaport")).is_err());
    }
}
