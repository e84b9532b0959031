fn main() -> Result<(), Box<dyn std::error::Error>> {
    shade_match::run(wild::args_os())?;
    Ok(())
}
