use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("uartscope {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: uartscope");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("UARTSCOPE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("UARTSCOPE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: async={}, cli=true",
        cfg!(feature = "async")
    );
    println!(
        "defaults: baud={}, cadence={}ms, log={}",
        uartscope_transport::DEFAULT_BAUD_RATE,
        uartscope_pipeline::DEFAULT_CADENCE_MS,
        uartscope_pipeline::DEFAULT_LOG_PATH
    );

    Ok(SUCCESS)
}
