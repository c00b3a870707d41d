fn main() -> Result<(), Box<dyn std::error::Error>> {
    prodev::cli::main()
}
