//! Benchmarks for IRC message parsing, serialization and mode decoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nebo_irc::{parse_channel_modes, Dispatcher, Message, Prefix, ServerSupport};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// CTCP request
const CTCP_MESSAGE: &str = ":nick!user@host PRIVMSG me :\x01PING 1700000000\x01";

/// Numeric response
const NUMERIC_RESPONSE: &str = ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

/// Unknown command, handled by the generic fallback
const UNKNOWN_COMMAND: &str = ":irc.server.net FROBNICATE a b c :d e f";

/// A typical burst after registration.
const SESSION: &[&str] = &[
    ":irc.server.net 001 nick :Welcome",
    ":irc.server.net 002 nick :Your host is irc.server.net",
    ":irc.server.net 005 nick CHANTYPES=# PREFIX=(ov)@+ NICKLEN=30 :are supported by this server",
    ":irc.server.net 375 nick :- irc.server.net Message of the day -",
    ":irc.server.net 372 nick :- hello",
    ":irc.server.net 372 nick :- world",
    ":irc.server.net 376 nick :End of /MOTD command.",
    ":nick!user@host JOIN #channel",
    ":irc.server.net 353 nick = #channel :@nick +alice bob",
    ":irc.server.net 366 nick #channel :End of /NAMES list.",
    ":alice!a@host PRIVMSG #channel :hi",
    ":bob!b@host PRIVMSG #channel :hello",
    "PING :irc.server.net",
];

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    for (name, line) in [
        ("simple_ping", SIMPLE_MESSAGE),
        ("with_prefix", PREFIX_MESSAGE),
        ("ctcp", CTCP_MESSAGE),
        ("numeric_response", NUMERIC_RESPONSE),
        ("unknown_command", UNKNOWN_COMMAND),
    ] {
        group.bench_with_input(BenchmarkId::new("fresh", name), line, |b, s| {
            b.iter(|| {
                let msg: Message = black_box(s).parse().unwrap();
                black_box(msg)
            })
        });
    }

    group.finish();
}

fn benchmark_dispatcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dispatcher");

    group.bench_function("fresh_per_line", |b| {
        b.iter(|| {
            for line in SESSION {
                let msg: Message = black_box(line).parse().unwrap();
                black_box(msg);
            }
        })
    });

    // The reused dispatcher has already moved the session's types forward.
    let mut dispatcher = Dispatcher::new();
    group.bench_function("reused", |b| {
        b.iter(|| {
            for line in SESSION {
                let msg = dispatcher.parse(black_box(line)).unwrap();
                black_box(msg);
            }
        })
    });

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Serialization");

    let simple: Message = SIMPLE_MESSAGE.parse().unwrap();
    let with_prefix: Message = PREFIX_MESSAGE.parse().unwrap();
    let numeric: Message = NUMERIC_RESPONSE.parse().unwrap();

    group.bench_function("simple_ping", |b| b.iter(|| black_box(black_box(&simple).to_string())));
    group.bench_function("with_prefix", |b| b.iter(|| black_box(black_box(&with_prefix).to_string())));
    group.bench_function("numeric_response", |b| b.iter(|| black_box(black_box(&numeric).to_string())));

    group.bench_function("privmsg_construct", |b| {
        b.iter(|| {
            let msg = Message::privmsg(black_box("#channel"), black_box("Hello!"))
                .with_prefix(Prefix::new_user("nick", "user", "host"));
            black_box(msg.to_string())
        })
    });

    group.finish();
}

fn benchmark_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mode Parsing");

    let mut support = ServerSupport::default();
    support.load([
        ("CHANMODES", Some("beI,k,l,imnpstCR")),
        ("PREFIX", Some("(qaohv)~&@%+")),
    ]);
    let args = ["alice", "bob", "*!*@spam", "secret", "25"];

    group.bench_function("mixed", |b| {
        b.iter(|| {
            let modes = parse_channel_modes(black_box("+ov-b+kl-mn"), &args, &support).unwrap();
            black_box(modes)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_dispatcher,
    benchmark_serialization,
    benchmark_modes,
);

criterion_main!(benches);
