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

use std::path::PathBuf;

use clap::Parser;

/// Send a photo booth picture as an e-mail attachment.
///
/// The sender account is read from SENDER_EMAIL and SENDER_PASSWORD,
/// which may also be set in a `.env` file.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Recipient e-mail address.
    #[arg(long)]
    pub to: String,

    /// Name shown in the subject line.
    #[arg(long)]
    pub name: String,

    /// Full path to the file to attach.
    #[arg(long)]
    pub file: PathBuf,

    /// Settings file to load instead of `./.env`.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}
