// RX Trace - Command Line Arguments

#[derive(clap::Parser, Debug)]
#[command(about = "RX Trace - intercepting logger for the X11 core protocol")]
pub struct CommandlineArgs {
    /// Display to listen on for client connections
    #[arg(short, long, default_value = ":9")]
    pub listen: String,

    /// Real display to forward traffic to
    #[arg(short = 'd', long, default_value = ":0")]
    pub display: String,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print hidden protocol counters (lengths, opcodes, unused fields)
    #[arg(short, long)]
    pub verbose: bool,

    /// Pretty-print each message across multiple lines
    #[arg(short, long)]
    pub multiline: bool,

    /// Render TIMESTAMP fields as wall-clock UTC relative to an anchor
    #[arg(long)]
    pub relative_timestamps: bool,

    /// Anchor for relative timestamps, as "server_tick,unix_seconds"
    #[arg(long, value_name = "TICK,UNIX")]
    pub timestamp_anchor: Option<String>,

    /// Rewrite QueryExtension replies so every extension appears absent
    #[arg(long)]
    pub deny_all_extensions: bool,

    /// Write the trace to this file instead of standard output
    #[arg(short, long)]
    pub outfile: Option<String>,

    /// Hex-dump the raw bytes of messages that fail to decode
    #[arg(long)]
    pub dump_malformed: bool,
}
