//! Server queries (RFC 2812 section 3.4).

use super::CommandMessage;
use crate::error::MessageParseError;
use crate::message::args::optional;
use crate::message::MessageWriter;

macro_rules! target_query {
    ($(#[$doc:meta])* $name:ident, $keyword:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Default)]
        pub struct $name {
            /// Server to forward the query to.
            pub target: Option<String>,
        }

        impl CommandMessage for $name {
            const KEYWORD: &'static str = $keyword;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    target: optional(params, 0),
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.opt_param(self.target.as_deref());
            }
        }
    };
}

target_query! {
    /// `MOTD [target]`
    Motd, "MOTD"
}
target_query! {
    /// `VERSION [target]`
    Version, "VERSION"
}
target_query! {
    /// `TIME [target]`
    Time, "TIME"
}
target_query! {
    /// `TRACE [target]`
    Trace, "TRACE"
}
target_query! {
    /// `ADMIN [target]`
    Admin, "ADMIN"
}
target_query! {
    /// `INFO [target]`
    Info, "INFO"
}

/// `LUSERS [mask [target]]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Lusers {
    pub mask: Option<String>,
    pub target: Option<String>,
}

impl CommandMessage for Lusers {
    const KEYWORD: &'static str = "LUSERS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Lusers {
            mask: optional(params, 0),
            target: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some(mask) = &self.mask {
            w.param(mask.as_str()).opt_param(self.target.as_deref());
        }
    }
}

/// `STATS [query [target]]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Stats {
    pub query: Option<String>,
    pub target: Option<String>,
}

impl CommandMessage for Stats {
    const KEYWORD: &'static str = "STATS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Stats {
            query: optional(params, 0),
            target: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some(query) = &self.query {
            w.param(query.as_str()).opt_param(self.target.as_deref());
        }
    }
}

/// `LINKS [[remote] mask]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Links {
    pub remote: Option<String>,
    pub mask: Option<String>,
}

impl CommandMessage for Links {
    const KEYWORD: &'static str = "LINKS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(match params {
            [] => Links::default(),
            [mask] => Links {
                remote: None,
                mask: Some(mask.to_string()),
            },
            [remote, mask, ..] => Links {
                remote: Some(remote.to_string()),
                mask: Some(mask.to_string()),
            },
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some(mask) = &self.mask {
            w.opt_param(self.remote.as_deref()).param(mask.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_positional_forms() {
        assert_eq!(Links::parse(&[]).unwrap(), Links::default());
        let one = Links::parse(&["*.net"]).unwrap();
        assert_eq!(one.remote, None);
        assert_eq!(one.mask.as_deref(), Some("*.net"));
        let two = Links::parse(&["hub.net", "*.net"]).unwrap();
        assert_eq!(two.remote.as_deref(), Some("hub.net"));
    }

    #[test]
    fn target_queries() {
        assert_eq!(Motd::parse(&[]).unwrap().target, None);
        assert_eq!(Version::parse(&["irc.b"]).unwrap().target.as_deref(), Some("irc.b"));
        let mut w = MessageWriter::new();
        Stats::parse(&["u"]).unwrap().write_params(&mut w);
        assert_eq!(w.params(), ["u"]);
    }
}
