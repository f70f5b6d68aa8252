//! # Credential Generator
//!
//! Hashes a password and prints the credential JSON object ready to paste
//! into the `USERS_JSON` array (or a `USERS_FILE` document).
//!
//! ## Usage
//! ```bash
//! # Active admin account (the defaults)
//! cargo run -p gestio-server --bin adduser -- ana@gestio.local secret123
//!
//! # Restricted account
//! cargo run -p gestio-server --bin adduser -- caja@gestio.local secret123 --role user
//!
//! # Provision disabled, enable later by editing the JSON
//! cargo run -p gestio-server --bin adduser -- ana@gestio.local secret123 --inactive
//! ```

use std::env;
use std::process;

use gestio_core::types::Role;
use gestio_server::auth::{hash_password, RawCredential};

fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut email: Option<String> = None;
    let mut password: Option<String> = None;
    let mut role = Role::Admin;
    let mut active = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--role" | "-r" => {
                if i + 1 < args.len() {
                    role = match args[i + 1].as_str() {
                        "admin" => Role::Admin,
                        "user" => Role::User,
                        other => {
                            eprintln!("Unknown role '{}': expected admin or user", other);
                            process::exit(1);
                        }
                    };
                    i += 1;
                }
            }
            "--inactive" => {
                active = false;
            }
            "--help" | "-h" => {
                println!("Gestio Credential Generator");
                println!();
                println!("Usage: adduser <email> <password> [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -r, --role <ROLE>  Account role: admin or user (default: admin)");
                println!("      --inactive     Provision the account disabled");
                println!("  -h, --help         Show this help message");
                return;
            }
            other if email.is_none() => email = Some(other.to_string()),
            other if password.is_none() => password = Some(other.to_string()),
            other => {
                eprintln!("Unexpected argument '{}'", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let (Some(email), Some(password)) = (email, password) else {
        eprintln!("Usage: adduser <email> <password> [--role admin|user] [--inactive]");
        process::exit(1);
    };

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("Failed to hash password: {}", e);
            process::exit(1);
        }
    };

    let credential = RawCredential {
        email,
        password_hash,
        role,
        active,
    };

    match serde_json::to_string_pretty(&credential) {
        Ok(json) => {
            println!("{}", json);
            eprintln!();
            eprintln!("✓ Append this object to the USERS_JSON array (or your USERS_FILE)");
        }
        Err(e) => {
            eprintln!("Failed to render credential: {}", e);
            process::exit(1);
        }
    }
}
