// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the kiosk.
//!
//! Localization uses the Fluent system. The locale is resolved from CLI
//! arguments, the config file, or the OS, in that order, with `en-US` as
//! the fallback. Translation files are embedded into the binary.

pub mod fluent;
