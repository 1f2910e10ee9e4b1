// SPDX-License-Identifier: MIT

use clap::Parser;
use ckp_ctl::{is_success, send_command, Cli};

fn main() {
    let cli = Cli::parse();

    match send_command(&cli.sockdir, &cli.command) {
        Ok(Some(reply)) => {
            println!("{reply}");
            std::process::exit(i32::from(!is_success(&reply)));
        }
        Ok(None) => std::process::exit(0),
        Err(e) => {
            eprintln!("ckpoolctl: {e}");
            std::process::exit(1);
        }
    }
}
