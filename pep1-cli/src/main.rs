use std::fs;

use anyhow::Context;
use clap::Parser;
use pep1_codec::{key_from_hex, simple_decode_stage1, simple_encode};

use crate::opts::{Action, Opts};

mod opts;

fn main() -> anyhow::Result<()> {
    let options = Opts::parse();

    let key_common = key_from_hex(&options.common).context("invalid common key")?;
    let key_priv = key_from_hex(&options.private).context("invalid private key")?;

    let data = fs::read(&options.file)
        .with_context(|| format!("unable to read {}", options.file.display()))?;

    let out = match options.action {
        Action::Encode => simple_encode(options.auth_id, &data, &key_common, &key_priv)?,
        Action::Decode => {
            let stage1 = simple_decode_stage1(&data, &key_common)?;
            println!(
                "auth_id 0x{:08x}, payload {} bytes",
                stage1.auth_id(),
                stage1.payload_size()
            );
            stage1.finish(&key_priv)?
        }
    };

    let dest = options.dest_path();
    fs::write(&dest, &out).with_context(|| format!("unable to write {}", dest.display()))?;
    println!("wrote {} bytes to {}", out.len(), dest.display());

    Ok(())
}
