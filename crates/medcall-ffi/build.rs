fn main() {
    uniffi::generate_scaffolding("src/medcall.udl").unwrap();
}
