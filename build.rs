fn main() {
    // ESP-IDF link arguments are only needed for firmware builds; host test
    // builds leave the `espidf` feature off and skip embuild entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
