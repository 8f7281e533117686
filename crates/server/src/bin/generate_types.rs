//! Exports the wire types consumed by the dashboard front end.
//!
//! Run with: cargo run --package server --bin generate-types --features typescript [OUT_DIR]

use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUT_DIR: &str = "dashboard/src/types/generated";

fn main() {
    let out_dir: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    let out_dir = out_dir.as_path();

    println!("Generating TypeScript types into {}", out_dir.display());

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "typescript")]
    {
        use ts_rs::TS;

        let exports: [(&str, Result<(), ts_rs::ExportError>); 4] = [
            (
                "StageRequest",
                stagecraft_core::StageRequestPayload::export_all_to(out_dir),
            ),
            ("RichTextSpan", stagecraft_core::RichTextSpan::export_all_to(out_dir)),
            ("Block", stagecraft_core::Block::export_all_to(out_dir)),
            ("ProgressEvent", events::ProgressEvent::export_all_to(out_dir)),
        ];

        for (name, result) in exports {
            if let Err(e) = result {
                eprintln!("Failed to export {}: {}", name, e);
                std::process::exit(1);
            }
        }

        if let Err(e) = generate_index(out_dir) {
            eprintln!("Failed to write index.ts: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "typescript"))]
    {
        eprintln!("Error: typescript feature is not enabled");
        eprintln!("Run with: cargo run --package server --bin generate-types --features typescript");
        std::process::exit(1);
    }
}

#[cfg(feature = "typescript")]
const EXPORTED: [&str; 4] = ["StageRequest", "RichTextSpan", "Block", "ProgressEvent"];

#[cfg(feature = "typescript")]
fn generate_index(out_dir: &Path) -> std::io::Result<()> {
    let index_path = out_dir.join("index.ts");

    let mut index = String::from("// Generated by the generate-types binary. Do not edit.\n\n");
    for name in EXPORTED {
        index.push_str(&format!("export * from './{}';\n", name));
    }

    fs::write(&index_path, index)?;
    println!("Generated {}", index_path.display());
    Ok(())
}
