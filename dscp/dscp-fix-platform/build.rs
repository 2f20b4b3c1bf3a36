// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::io::Error;

fn main() -> Result<(), Error> {
    // allow overriding the detected features with an env variable
    if let Some(features) = option_env("DSCP_FIX_PLATFORM_FEATURES_OVERRIDE") {
        for feature in features.split(',') {
            let feature = feature.trim();
            if !feature.is_empty() {
                supports(feature);
            }
        }
        return Ok(());
    }

    let target_os = env("CARGO_CFG_TARGET_OS");

    match target_os.as_str() {
        // winsock accepts IP_TOS but never applies it to outgoing packets so
        // the value needs to go through the QoS2 API instead
        "windows" => {
            supports("qos");
        }
        "linux" | "android" | "macos" | "ios" | "freebsd" | "netbsd" | "openbsd"
        | "dragonfly" => {
            supports("tos");
        }
        // anything else falls back to `native::Unsupported`
        _ => {}
    }

    Ok(())
}

fn supports(name: &str) {
    println!("cargo:rustc-cfg=dscp_fix_platform_{name}");
}

fn env(name: &str) -> String {
    option_env(name).unwrap_or_else(|| panic!("build script missing {name:?} environment variable"))
}

fn option_env(name: &str) -> Option<String> {
    println!("cargo:rerun-if-env-changed={name}");
    std::env::var(name).ok()
}
