fn main() {
    println!("cargo:rerun-if-env-changed=THERMOGUARD_CONFIG_JSON");

    // Host builds (tests, fuzzing) have no ESP-IDF toolchain to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
