//! The owned per-server capability model.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use super::{ChanLimit, ChanModes, Isupport, MaxList, PrefixSpec, TargMax};
use crate::casemap::CaseMapping;
use crate::message::{Body, Message};
use crate::response::Reply;

/// Extension flags recognised by name. Their values (if any) are retained.
const KNOWN_EXTENSIONS: &[&str] = &[
    "SAFELIST",
    "WHOX",
    "KNOCK",
    "CALLERID",
    "USERIP",
    "CPRIVMSG",
    "CNOTICE",
    "ETRACE",
    "NAMESX",
    "UHNAMES",
    "WALLCHOPS",
    "WALLVOICES",
    "FNC",
    "PENALTY",
    "ELIST",
];

/// How a channel mode letter consumes arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeClass {
    /// A membership prefix mode (`PREFIX`); always takes a nick.
    Prefix,
    /// A list mode (`CHANMODES` group A); takes a mask, or none for a query.
    List,
    /// Always takes a parameter (group B).
    Parameter,
    /// Takes a parameter only when set (group C).
    ParameterWhenSet,
    /// Never takes a parameter (group D).
    NoParameter,
}

/// Everything a server has told us about itself through RPL_ISUPPORT.
///
/// Starts out with RFC 1459 defaults and is refined by [`load`](Self::load)
/// as 005 replies arrive. Later values for a key replace earlier ones.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerSupport {
    network: Option<String>,
    case_mapping: CaseMapping,
    channel_types: String,
    list_modes: String,
    parameter_modes: String,
    parameter_when_set_modes: String,
    no_parameter_modes: String,
    prefix_modes: String,
    prefix_symbols: String,
    max_nick_length: usize,
    max_channel_length: usize,
    max_topic_length: Option<usize>,
    max_kick_length: Option<usize>,
    max_away_length: Option<usize>,
    max_modes: Option<usize>,
    max_watches: usize,
    max_monitors: usize,
    max_silence: usize,
    channel_limits: BTreeMap<String, usize>,
    max_targets: BTreeMap<String, Option<usize>>,
    max_list_entries: BTreeMap<char, usize>,
    /// `CHANLIMIT`, `MAXLIST` and `TARGMAX` once seen; their legacy
    /// counterparts no longer apply.
    modern_limits: BTreeSet<String>,
    ban_exceptions: Option<char>,
    invite_exceptions: Option<char>,
    status_message: String,
    extensions: BTreeMap<String, Option<String>>,
    unknown: BTreeMap<String, Option<String>>,
}

impl Default for ServerSupport {
    fn default() -> Self {
        ServerSupport {
            network: None,
            case_mapping: CaseMapping::Rfc1459,
            channel_types: "#&".to_string(),
            list_modes: "beI".to_string(),
            parameter_modes: "k".to_string(),
            parameter_when_set_modes: "l".to_string(),
            no_parameter_modes: "imnpst".to_string(),
            prefix_modes: "ov".to_string(),
            prefix_symbols: "@+".to_string(),
            max_nick_length: 9,
            max_channel_length: 200,
            max_topic_length: None,
            max_kick_length: None,
            max_away_length: None,
            max_modes: Some(3),
            max_watches: 0,
            max_monitors: 0,
            max_silence: 0,
            channel_limits: BTreeMap::new(),
            max_targets: BTreeMap::new(),
            max_list_entries: BTreeMap::new(),
            modern_limits: BTreeSet::new(),
            ban_exceptions: None,
            invite_exceptions: None,
            status_message: String::new(),
            extensions: BTreeMap::new(),
            unknown: BTreeMap::new(),
        }
    }
}

/// Parse a numeric token value, warning and yielding `None` on failure.
fn number(key: &str, value: Option<&str>) -> Option<usize> {
    let Some(raw) = value else {
        warn!(key, "ISUPPORT token is missing its numeric value");
        return None;
    };
    match raw.parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = raw, "ignoring non-numeric ISUPPORT value");
            None
        }
    }
}

impl ServerSupport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a sequence of `KEY` / `KEY=VALUE` tokens.
    ///
    /// A token of the form `-KEY` restores that key's default.
    pub fn load<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        for (key, value) in tokens {
            if let Some(negated) = key.strip_prefix('-') {
                self.reset(negated);
                continue;
            }
            self.apply(key, value);
        }
    }

    /// Ingest the tokens of an RPL_ISUPPORT reply. Returns `false` (and
    /// changes nothing) for any other message.
    pub fn load_message(&mut self, message: &Message) -> bool {
        match &message.body {
            Body::Numeric(numeric) => match &numeric.reply {
                Reply::Support(reply) => {
                    let isupport = Isupport::from_reply(reply);
                    self.load(isupport.iter().map(|e| (e.key, e.value)));
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn apply(&mut self, key: &str, value: Option<&str>) {
        let upper = key.to_ascii_uppercase();
        trace!(key = %upper, ?value, "loading ISUPPORT token");
        match upper.as_str() {
            "NETWORK" => self.network = value.map(str::to_string),
            "CASEMAPPING" => match value.map(str::parse::<CaseMapping>) {
                Some(Ok(mapping)) => self.case_mapping = mapping,
                Some(Err(other)) => {
                    warn!(value = %other, "unknown CASEMAPPING, keeping {}", self.case_mapping)
                }
                None => warn!("CASEMAPPING token without a value"),
            },
            "CHANTYPES" => self.channel_types = value.unwrap_or_default().to_string(),
            "CHANMODES" => {
                if let Some(groups) = value.and_then(ChanModes::parse) {
                    self.load_chanmodes(groups);
                }
            }
            "PREFIX" => match value {
                None | Some("") => {
                    self.prefix_modes.clear();
                    self.prefix_symbols.clear();
                }
                Some(raw) => match PrefixSpec::parse(raw) {
                    Some(spec) => {
                        self.prefix_modes = spec.modes.to_string();
                        self.prefix_symbols = spec.prefixes.to_string();
                    }
                    None => warn!(value = raw, "ignoring malformed PREFIX"),
                },
            },
            "NICKLEN" | "MAXNICKLEN" => {
                if let Some(n) = number(&upper, value) {
                    self.max_nick_length = n;
                }
            }
            "CHANNELLEN" => {
                if let Some(n) = number(&upper, value) {
                    self.max_channel_length = n;
                }
            }
            "TOPICLEN" => {
                if let Some(n) = number(&upper, value) {
                    self.max_topic_length = Some(n);
                }
            }
            "KICKLEN" => {
                if let Some(n) = number(&upper, value) {
                    self.max_kick_length = Some(n);
                }
            }
            "AWAYLEN" => {
                if let Some(n) = number(&upper, value) {
                    self.max_away_length = Some(n);
                }
            }
            "MODES" => match value {
                None | Some("") => self.max_modes = None,
                Some(_) => {
                    if let Some(n) = number(&upper, value) {
                        self.max_modes = Some(n);
                    }
                }
            },
            "WATCH" => {
                if let Some(n) = number(&upper, value) {
                    self.max_watches = n;
                }
            }
            "MONITOR" => match value {
                None | Some("") => self.max_monitors = usize::MAX,
                Some(_) => {
                    if let Some(n) = number(&upper, value) {
                        self.max_monitors = n;
                    }
                }
            },
            "SILENCE" => {
                if let Some(n) = number(&upper, value) {
                    self.max_silence = n;
                }
            }
            "MAXCHANNELS" => {
                if let Some(n) = number(&upper, value) {
                    if !self.modern_limits.contains("CHANLIMIT") {
                        self.channel_limits.clear();
                        self.channel_limits.insert(self.channel_types.clone(), n);
                    }
                }
            }
            "CHANLIMIT" => {
                self.modern_limits.insert(upper.clone());
                self.channel_limits.clear();
                for (prefixes, limit) in ChanLimit::parse(value.unwrap_or_default()).iter() {
                    self.channel_limits.insert(prefixes.to_string(), limit);
                }
            }
            "MAXBANS" => {
                if let Some(n) = number(&upper, value) {
                    if !self.modern_limits.contains("MAXLIST") {
                        self.max_list_entries.insert('b', n);
                    }
                }
            }
            "MAXLIST" => {
                self.modern_limits.insert(upper.clone());
                for (mode, limit) in MaxList::parse(value.unwrap_or_default()).iter() {
                    self.max_list_entries.insert(mode, limit);
                }
            }
            "MAXTARGETS" => {
                if let Some(n) = number(&upper, value) {
                    if !self.modern_limits.contains("TARGMAX") {
                        for command in ["PRIVMSG", "NOTICE"] {
                            self.max_targets.insert(command.to_string(), Some(n));
                        }
                    }
                }
            }
            "TARGMAX" => {
                self.modern_limits.insert(upper.clone());
                self.max_targets.clear();
                for (command, limit) in TargMax::parse(value.unwrap_or_default()).iter() {
                    self.max_targets.insert(command.to_ascii_uppercase(), limit);
                }
            }
            "EXCEPTS" => {
                self.ban_exceptions = Some(value.and_then(|v| v.chars().next()).unwrap_or('e'))
            }
            "INVEX" => {
                self.invite_exceptions = Some(value.and_then(|v| v.chars().next()).unwrap_or('I'))
            }
            "STATUSMSG" => self.status_message = value.unwrap_or_default().to_string(),
            flag if KNOWN_EXTENSIONS.contains(&flag) => {
                self.extensions
                    .insert(upper.clone(), value.map(str::to_string));
            }
            _ => {
                debug!(key, ?value, "retaining unrecognised ISUPPORT token");
                self.unknown.insert(key.to_string(), value.map(str::to_string));
            }
        }
    }

    fn load_chanmodes(&mut self, groups: ChanModes<'_>) {
        if let Some(a) = groups.a {
            self.list_modes = a.to_string();
        }
        if let Some(b) = groups.b {
            self.parameter_modes = b.to_string();
        }
        if let Some(c) = groups.c {
            self.parameter_when_set_modes = c.to_string();
        }
        if let Some(d) = groups.d {
            self.no_parameter_modes = d.to_string();
        }
    }

    /// Restore a key to its default after a `-KEY` token.
    fn reset(&mut self, key: &str) {
        let defaults = ServerSupport::default();
        let upper = key.to_ascii_uppercase();
        debug!(key = %upper, "ISUPPORT key negated");
        match upper.as_str() {
            "NETWORK" => self.network = defaults.network,
            "CASEMAPPING" => self.case_mapping = defaults.case_mapping,
            "CHANTYPES" => self.channel_types = defaults.channel_types,
            "CHANMODES" => {
                self.list_modes = defaults.list_modes;
                self.parameter_modes = defaults.parameter_modes;
                self.parameter_when_set_modes = defaults.parameter_when_set_modes;
                self.no_parameter_modes = defaults.no_parameter_modes;
            }
            "PREFIX" => {
                self.prefix_modes = defaults.prefix_modes;
                self.prefix_symbols = defaults.prefix_symbols;
            }
            "NICKLEN" | "MAXNICKLEN" => self.max_nick_length = defaults.max_nick_length,
            "CHANNELLEN" => self.max_channel_length = defaults.max_channel_length,
            "TOPICLEN" => self.max_topic_length = defaults.max_topic_length,
            "KICKLEN" => self.max_kick_length = defaults.max_kick_length,
            "AWAYLEN" => self.max_away_length = defaults.max_away_length,
            "MODES" => self.max_modes = defaults.max_modes,
            "WATCH" => self.max_watches = defaults.max_watches,
            "MONITOR" => self.max_monitors = defaults.max_monitors,
            "SILENCE" => self.max_silence = defaults.max_silence,
            "MAXCHANNELS" | "CHANLIMIT" => {
                self.channel_limits = defaults.channel_limits;
                self.modern_limits.remove("CHANLIMIT");
            }
            "MAXBANS" => {
                self.max_list_entries.remove(&'b');
            }
            "MAXLIST" => {
                self.max_list_entries = defaults.max_list_entries;
                self.modern_limits.remove("MAXLIST");
            }
            "MAXTARGETS" | "TARGMAX" => {
                self.max_targets = defaults.max_targets;
                self.modern_limits.remove("TARGMAX");
            }
            "EXCEPTS" => self.ban_exceptions = defaults.ban_exceptions,
            "INVEX" => self.invite_exceptions = defaults.invite_exceptions,
            "STATUSMSG" => self.status_message = defaults.status_message,
            _ => {
                self.extensions.remove(&upper);
                self.unknown.retain(|k, _| !k.eq_ignore_ascii_case(key));
            }
        }
    }

    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    pub fn case_mapping(&self) -> CaseMapping {
        self.case_mapping
    }

    pub fn channel_types(&self) -> &str {
        &self.channel_types
    }

    /// Group A letters.
    pub fn list_modes(&self) -> &str {
        &self.list_modes
    }

    /// Letters that always take a parameter: list modes (A) and group B.
    pub fn modes_with_parameters(&self) -> String {
        let mut s = self.list_modes.clone();
        s.push_str(&self.parameter_modes);
        s
    }

    /// Group C letters.
    pub fn modes_with_parameters_when_set(&self) -> &str {
        &self.parameter_when_set_modes
    }

    /// Group D letters.
    pub fn modes_without_parameters(&self) -> &str {
        &self.no_parameter_modes
    }

    /// Membership mode letters from `PREFIX`, highest rank first.
    pub fn prefix_modes(&self) -> &str {
        &self.prefix_modes
    }

    /// Membership symbols from `PREFIX`, in the same order as the letters.
    pub fn prefix_symbols(&self) -> &str {
        &self.prefix_symbols
    }

    /// Map a membership symbol (`@`) to its mode letter (`o`).
    pub fn prefix_mode_for_symbol(&self, symbol: char) -> Option<char> {
        let index = self.prefix_symbols.chars().position(|c| c == symbol)?;
        self.prefix_modes.chars().nth(index)
    }

    /// Classify a channel mode letter. Letters the server never advertised
    /// yield `None`.
    pub fn mode_class(&self, letter: char) -> Option<ModeClass> {
        if self.prefix_modes.contains(letter) {
            Some(ModeClass::Prefix)
        } else if self.list_modes.contains(letter) {
            Some(ModeClass::List)
        } else if self.parameter_modes.contains(letter) {
            Some(ModeClass::Parameter)
        } else if self.parameter_when_set_modes.contains(letter) {
            Some(ModeClass::ParameterWhenSet)
        } else if self.no_parameter_modes.contains(letter) {
            Some(ModeClass::NoParameter)
        } else {
            None
        }
    }

    pub fn max_nick_length(&self) -> usize {
        self.max_nick_length
    }

    pub fn max_channel_length(&self) -> usize {
        self.max_channel_length
    }

    pub fn max_topic_length(&self) -> Option<usize> {
        self.max_topic_length
    }

    pub fn max_kick_length(&self) -> Option<usize> {
        self.max_kick_length
    }

    pub fn max_away_length(&self) -> Option<usize> {
        self.max_away_length
    }

    /// Mode changes per MODE line; `None` means the server sets no limit.
    pub fn max_modes(&self) -> Option<usize> {
        self.max_modes
    }

    /// WATCH list size; 0 when WATCH is unsupported.
    pub fn max_watches(&self) -> usize {
        self.max_watches
    }

    /// MONITOR list size; 0 when unsupported, `usize::MAX` when unlimited.
    pub fn max_monitors(&self) -> usize {
        self.max_monitors
    }

    /// SILENCE list size; 0 when unsupported.
    pub fn max_silence(&self) -> usize {
        self.max_silence
    }

    /// The channel-limit table keyed by channel-type prefix group.
    pub fn channel_limits(&self) -> &BTreeMap<String, usize> {
        &self.channel_limits
    }

    /// How many channels of the given type may be joined at once.
    pub fn channel_limit(&self, prefix: char) -> Option<usize> {
        self.channel_limits
            .iter()
            .find(|(group, _)| group.contains(prefix))
            .map(|(_, n)| *n)
    }

    /// Per-command target limit. `None` when the server advertises no limit
    /// for this command.
    pub fn max_targets(&self, command: &str) -> Option<usize> {
        self.max_targets
            .get(&command.to_ascii_uppercase())
            .copied()
            .flatten()
    }

    /// Maximum entries on a list mode, if advertised.
    pub fn max_list_entries(&self, letter: char) -> Option<usize> {
        self.max_list_entries.get(&letter).copied()
    }

    pub fn ban_exceptions(&self) -> Option<char> {
        self.ban_exceptions
    }

    pub fn invite_exceptions(&self) -> Option<char> {
        self.invite_exceptions
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Does `name` start with one of the advertised channel types?
    pub fn is_channel_name(&self, name: &str) -> bool {
        name.chars()
            .next()
            .map_or(false, |c| self.channel_types.contains(c))
    }

    /// Was an extension flag or unrecognised key advertised?
    pub fn supports(&self, key: &str) -> bool {
        let upper = key.to_ascii_uppercase();
        self.extensions.contains_key(&upper)
            || self.unknown.keys().any(|k| k.eq_ignore_ascii_case(key))
    }

    /// The recognised extension flags and their values.
    pub fn extensions(&self) -> &BTreeMap<String, Option<String>> {
        &self.extensions
    }

    /// Names of the recognised extension flags that were advertised.
    pub fn extension_names(&self) -> BTreeSet<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    /// The verbatim value of an unrecognised key. `Some(None)` means the key
    /// was present without a value.
    pub fn unknown(&self, key: &str) -> Option<Option<&str>> {
        self.unknown
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref())
    }
}
