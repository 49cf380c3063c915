use voltguard_feed::{DEFAULT_ENDPOINT, DEFAULT_RETRY_DELAY};
use voltguard_wire::MAGIC;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("voltguard {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: voltguard");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("VOLTGUARD_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("wire_magic: {}", String::from_utf8_lossy(&MAGIC));
    println!("default_endpoint: {DEFAULT_ENDPOINT}");
    println!("retry_delay_ms: {}", DEFAULT_RETRY_DELAY.as_millis());

    Ok(SUCCESS)
}
