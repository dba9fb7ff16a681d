use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 15] = [
        "RUST_LOG",
        "CKT_HOST",
        "CKT_PORT",
        "CKT_DATABASE_URL",
        "CKT_BASE_FEE_CENTS",
        "CKT_DELIVERY_FEE_CENTS",
        "CKT_RESERVATION_HOLD_MINS",
        "CKT_SWEEP_INTERVAL_SECS",
        "CKT_POLL_INITIAL_DELAY_SECS",
        "CKT_POLL_REQUEUE_DELAY_SECS",
        "CKT_POLL_MAX_REQUEUES",
        "CKT_WEBHOOK_SIGNATURE_CHECKS",
        "CKT_GATEWAY_API_URL",
        "CKT_GATEWAY_TIMEOUT_SECS",
        "CKT_GATEWAY_MAX_RETRIES",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
