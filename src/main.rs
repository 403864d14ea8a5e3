/*
 * Copyright Stalwart Labs Ltd. See the COPYING
 * file at the top-level directory of this distribution.
 *
 * Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
 * https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
 * <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
 * option. This file may not be copied, modified, or distributed
 * except according to those terms.
 */

use std::{path::PathBuf, process::ExitCode};

use booth_mail::{
    cli::Args,
    config::{self, ServerSettings},
    delivery::{self, Failure, SmtpTransport},
};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // The settings file may carry RUST_LOG.
    let env_file = config::load_env_file(args.env_file.as_deref());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let result = send(&args, env_file).await;
    let (status, code) = delivery::outcome(&result);
    if result.is_ok() {
        println!("{status}");
    } else {
        eprintln!("{status}");
    }

    ExitCode::from(code)
}

async fn send(
    args: &Args,
    env_file: Result<Option<PathBuf>, config::Error>,
) -> Result<(), Failure> {
    if let Some(path) = env_file? {
        log::debug!("Loaded settings from {}", path.display());
    }
    let settings = ServerSettings::from_lookup(config::process_env)?;

    delivery::run(args, config::process_env, &SmtpTransport::new(settings)).await
}
