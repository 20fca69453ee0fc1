fn main() {
    // rdkit lives in the active conda environment
    println!("cargo:rerun-if-env-changed=CONDA_PREFIX");
    if let Ok(prefix) = std::env::var("CONDA_PREFIX") {
        println!("cargo:rustc-env=LD_LIBRARY_PATH={prefix}/lib");
    }
}
