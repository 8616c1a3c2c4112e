//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use envelope_core::InspectConfig;

use crate::input::InputSource;

/// Decode a base64 CBOR envelope and print its structure, or a byte-level
/// diagnosis when it does not parse.
#[derive(Debug, Parser)]
#[command(name = "envelope-inspect", version, about, long_about = None)]
pub struct Cli {
    /// Payload to inspect; `-` or omitted reads stdin
    #[arg(value_name = "PAYLOAD", conflicts_with = "file")]
    pub payload: Option<String>,

    /// Read the payload from a file instead
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Number of leading bytes in the hex dump
    #[arg(long, value_name = "BYTES")]
    pub hex_prefix: Option<usize>,

    /// Spaces per nesting level in the rendered structure (0-255)
    #[arg(long, value_name = "SPACES")]
    pub indent: Option<u8>,

    /// Report whether the holder has reached this age
    #[arg(long, value_name = "YEARS")]
    pub min_age: Option<u32>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Cli {
    /// Where the payload comes from.
    #[must_use]
    pub fn source(&self) -> InputSource {
        match (&self.file, self.payload.as_deref()) {
            (Some(path), _) => InputSource::File(path.clone()),
            (None, None | Some("-")) => InputSource::Stdin,
            (None, Some(literal)) => InputSource::Literal(literal.to_owned()),
        }
    }

    /// Apply command-line overrides on top of `base`.
    #[must_use]
    pub fn config(&self, mut base: InspectConfig) -> InspectConfig {
        if let Some(len) = self.hex_prefix {
            base.hex_prefix_len = len;
        }
        if let Some(width) = self.indent {
            base.indent_width = width;
        }
        if let Some(years) = self.min_age {
            base.min_age = Some(years);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        match Cli::try_parse_from(std::iter::once("envelope-inspect").chain(args.iter().copied())) {
            Ok(cli) => cli,
            Err(e) => panic!("unexpected parse error: {e}"),
        }
    }

    #[test]
    fn literal_payload_is_selected() {
        let cli = parse(&["pA"]);
        assert_eq!(cli.source(), InputSource::Literal("pA".to_owned()));
        assert!(!cli.json);
    }

    #[test]
    fn dash_or_nothing_reads_stdin() {
        assert_eq!(parse(&["-"]).source(), InputSource::Stdin);
        assert_eq!(parse(&[]).source(), InputSource::Stdin);
    }

    #[test]
    fn file_flag_selects_file() {
        let cli = parse(&["--file", "payload.txt", "--json"]);
        assert_eq!(cli.source(), InputSource::File(PathBuf::from("payload.txt")));
        assert!(cli.json);
    }

    #[test]
    fn payload_and_file_conflict() {
        let result = Cli::try_parse_from(["envelope-inspect", "pA", "--file", "x"]);
        assert!(result.is_err(), "payload and --file must be mutually exclusive");
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&["--hex-prefix", "8", "--indent", "4", "pA"]);
        let config = cli.config(InspectConfig::new());
        assert_eq!(config.hex_prefix_len, 8);
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.max_embedded_depth, InspectConfig::new().max_embedded_depth);
    }

    #[test]
    fn indent_beyond_a_byte_is_rejected() {
        let result = Cli::try_parse_from(["envelope-inspect", "--indent", "18446744073709551615", "pA"]);
        assert!(result.is_err(), "an unbounded indent must not reach the renderer");
        assert_eq!(parse(&["--indent", "255", "pA"]).indent, Some(u8::MAX));
    }

    #[test]
    fn min_age_flag_sets_threshold() {
        let config = parse(&["--min-age", "21", "pA"]).config(InspectConfig::new());
        assert_eq!(config.min_age, Some(21));
    }

    #[test]
    fn absent_flags_keep_base_config() {
        let cli = parse(&["pA"]);
        assert_eq!(cli.config(InspectConfig::new()), InspectConfig::new());
    }
}
