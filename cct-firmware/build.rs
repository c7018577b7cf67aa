// Build-Script: WiFi-Credentials aus .env und Linker-Skripte für den ESP32-C6

fn main() {
    // Linker ruft dieses Binary bei Fehlern erneut auf (--error-handling-script)
    let args: Vec<String> = std::env::args().collect();
    if let [_, kind, symbol, ..] = args.as_slice() {
        explain_link_error(kind, symbol);
    }

    // Ohne .env müssen WIFI_SSID und WIFI_PASSWORD in der Umgebung stehen
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env loaded ({e}), expecting WIFI_SSID and WIFI_PASSWORD in the environment");
    }

    // Wird per env! in config.rs eingebacken
    for key in ["WIFI_SSID", "WIFI_PASSWORD"] {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        println!(
            "cargo:rustc-link-arg=--error-handling-script={}",
            exe.display()
        );
    }

    println!("cargo:rustc-link-arg=-Tdefmt.x");
    // linkall.x muss als letztes Skript kommen
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

/// Gibt einen Hinweis zu einem undefinierten Symbol aus und beendet sich
fn explain_link_error(kind: &str, symbol: &str) -> ! {
    if kind != "undefined-symbol" {
        std::process::exit(1);
    }

    let hint = match symbol {
        s if s.starts_with("_defmt_") => Some("defmt symbols missing: is `-Tdefmt.x` linked and `esp-println` built with the `defmt-espflash` feature?"),
        "_stack_start" => Some("Linker script `linkall.x` is missing"),
        s if s.starts_with("esp_rtos_") => Some("esp-radio needs a scheduler: call `esp_rtos::start` before `esp_radio::init`"),
        "malloc" | "free" | "calloc" => Some("Heap functions missing: add `esp-alloc` and call `heap_allocator!` in main"),
        _ => None,
    };
    if let Some(hint) = hint {
        eprintln!("\nhint: {hint}\n");
    }
    std::process::exit(0);
}
