// SPDX-License-Identifier: MPL-2.0

use iced_kiosk::app::{self, Flags};

fn main() -> iced::Result {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();
    let flags = Flags {
        lang: args.opt_value_from_str("--lang").unwrap_or(None),
        video: args
            .finish()
            .into_iter()
            .next()
            .map(std::path::PathBuf::from),
    };

    app::run(flags)
}
