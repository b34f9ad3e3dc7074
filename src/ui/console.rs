use std::fmt::Display;
use std::io::{self, BufRead, Write};

// ---------------------------------------------------------------------------
// Line-oriented prompt / response over any reader and writer
// ---------------------------------------------------------------------------

/// Interactive terminal: prompts go to `output`, answers come from `input`.
///
/// Every read returns `None` once input is exhausted so callers can wind the
/// session down instead of spinning on an empty stream.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Writer for reports and tables.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print one line.
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Print `prompt` without a newline and read the answer, line ending removed.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        // Undecodable bytes become U+FFFD and fail validation like any typo.
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let answer = String::from_utf8_lossy(&line)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        log::trace!("answer to {prompt:?}: {answer:?}");
        Ok(Some(answer))
    }

    /// Re-prompt until `parse` accepts the answer, printing `rejection` after
    /// every refused line.
    pub fn ask_until<T>(
        &mut self,
        prompt: &str,
        rejection: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            if let Some(value) = parse(&answer) {
                return Ok(Some(value));
            }
            self.say(rejection)?;
        }
    }

    /// Recover the writer, mostly for inspecting output in tests.
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Strict `yes` / `no` reading used by the pager.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}
