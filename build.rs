use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let info_plist_src = Path::new(&manifest_dir).join("Info.plist");
    println!("cargo:rerun-if-changed={}", info_plist_src.display());

    // Camera and accessibility prompts on macOS read the usage strings from
    // an Info.plist next to the executable.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("macos") || !info_plist_src.exists() {
        return;
    }

    let out_dir = env::var("OUT_DIR").unwrap();
    let info_plist_dst = Path::new(&out_dir).join("../../../Info.plist");
    if let Err(e) = fs::copy(&info_plist_src, &info_plist_dst) {
        println!("cargo:warning=Failed to copy Info.plist: {}", e);
    }
}
