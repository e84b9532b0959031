use crate::Rgb;

pub(crate) fn validate_positive(value: &str) -> Result<u32, String> {
    let num = value
        .parse::<u32>()
        .map_err(|_| "Not a valid whole number".to_string())?;
    if num == 0 {
        return Err("Number must be greater than 0".to_string());
    }
    Ok(num)
}

pub(crate) fn validate_color(value: &str) -> Result<Rgb, String> {
    match Rgb::parse(value) {
        Ok(color) => Ok(color),
        Err(e) => Err(e.to_string()),
    }
}
