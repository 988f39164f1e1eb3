use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str = "A command-line PEP1 frame encoder/decoder";
const LONG_ABOUT: &str = "\
pep1-cli wraps a file into an authenticated, encrypted PEP1 frame, or unwraps \
a frame back into its plaintext. Frames are protected by two 128-bit Twofish \
keys: a common key covering the frame header and a per-auth-id private key \
covering the payload. Keys are given as 32-character hex strings.";

#[derive(Parser, Debug)]
#[command(name = "pep1-cli", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Opts {
    /// Common key shared by every participant, protects the frame
    /// header. 32 hex characters.
    #[clap(short, long)]
    pub common: String,

    /// Private key bound to the auth-id, protects the payload.
    /// 32 hex characters.
    #[clap(short, long)]
    pub private: String,

    /// Identifier stamped into encoded frames; receivers use it to
    /// select the private key.
    #[clap(short = 'i', long, default_value_t = 0)]
    pub auth_id: u32,

    /// Source file path to load the plain/encoded input.
    #[clap(short, long)]
    pub file: PathBuf,

    /// Destination file path to store the encoded/decoded output.
    #[clap(short, long)]
    pub dest: Option<PathBuf>,

    /// What action to perform, either to encode or to decode.
    #[clap(short, long)]
    pub action: Action,
}

impl Opts {
    pub fn dest_path(&self) -> PathBuf {
        if let Some(path) = &self.dest {
            return path.clone();
        }

        let mut path = PathBuf::new();
        path.push("./");
        path.push("processed.pep1");

        path
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Action {
    Encode,
    Decode,
}
