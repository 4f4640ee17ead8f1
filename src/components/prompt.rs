//! Console prompt for the meeting start time.

use super::google_calendar::time::parse_prompt_datetime;
use crate::error::{BotResult, Error};
use chrono::NaiveDateTime;
use std::io::{BufRead, Write};
use tracing::debug;

pub const INVALID_FORMAT_WARNING: &str =
    "\u{26A0}\u{FE0F} Invalid format. Please use 'YYYY-MM-DD HH:MM'.";

/// Ask until the answer parses as `YYYY-MM-DD HH:MM`.
///
/// There is no attempt limit. The loop only ends on a valid answer or when
/// the input is closed, which is reported as an error.
pub fn prompt_datetime<R, W>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> BotResult<NaiveDateTime>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "{}", message)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Input(
                "Input closed before a valid date-time was entered".to_string(),
            ));
        }

        match parse_prompt_datetime(&line) {
            Some(datetime) => return Ok(datetime),
            None => {
                debug!("Rejected date-time input {:?}", line.trim_end());
                writeln!(output, "{}", INVALID_FORMAT_WARNING)?;
            }
        }
    }
}
