use std::io;

use crate::formatter::{
    FmtConclusion, FmtTimeout, RunFormatter,
    color::{ColorSetting, SupportsColor, colors::*},
};

/// Writes a short summary of the run to `target`, stdout by default.
#[derive(Debug)]
pub struct PlainFormatter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
}

impl Default for PlainFormatter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: ColorSetting::default(),
        }
    }
}

impl<W: io::Write> PlainFormatter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        target: WithTarget,
    ) -> PlainFormatter<WithTarget> {
        PlainFormatter {
            target,
            color_setting: self.color_setting,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        Self {
            color_setting: color_setting.into(),
            ..self
        }
    }
}

impl<W: io::Write + SupportsColor> PlainFormatter<W> {
    /// Return whether this formatter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        match self.color_setting {
            ColorSetting::Automatic => self.target.supports_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }

    fn paint(&self, color: &'static str, text: &str) -> String {
        match self.use_color() {
            true => format!("{color}{text}{RESET}"),
            false => text.to_string(),
        }
    }
}

impl<W: io::Write + SupportsColor> RunFormatter for PlainFormatter<W> {
    type Error = io::Error;

    fn fmt_conclusion(
        &mut self,
        FmtConclusion { results, duration }: FmtConclusion<'_>,
    ) -> Result<(), Self::Error> {
        let failed = results.failed_count();
        let total = results.total_count();

        if failed > 0 {
            writeln!(self.target)?;
            writeln!(self.target, "failures:")?;
            for (idx, failure) in results.failures().enumerate() {
                write!(self.target, "    {idx}. [{}] {}", failure.group, failure.name)?;
                match &failure.message {
                    Some(message) => writeln!(self.target, " ({message})")?,
                    None => writeln!(self.target)?,
                }
            }
        }

        writeln!(self.target)?;
        let verdict = match failed {
            0 => self.paint(GREEN, "ok"),
            _ => self.paint(RED, "FAILED"),
        };
        writeln!(
            self.target,
            "test result: {verdict}. {} passed; {failed} failed; {total} total; finished in {:.2}s",
            total - failed,
            duration.as_secs_f64()
        )?;
        writeln!(self.target)
    }

    fn fmt_debug_mode(
        &mut self,
        FmtConclusion { results, duration }: FmtConclusion<'_>,
    ) -> Result<(), Self::Error> {
        let notice = self.paint(YELLOW, "debug mode");
        writeln!(self.target)?;
        writeln!(
            self.target,
            "{notice}: ran {} tests of the Debug group only in {:.2}s ({} failed)",
            results.total_count(),
            duration.as_secs_f64(),
            results.failed_count()
        )?;
        writeln!(
            self.target,
            "a debug run always exits with a failure code, move the tests out of the Debug group to run everything again"
        )?;
        writeln!(self.target)
    }

    fn fmt_timeout(&mut self, FmtTimeout { timeout }: FmtTimeout) -> Result<(), Self::Error> {
        let label = self.paint(RED, "TIMEOUT");
        writeln!(self.target)?;
        writeln!(
            self.target,
            "[{label}] global test timeout of {} seconds exceeded, exiting",
            timeout.as_secs_f64()
        )
    }
}
