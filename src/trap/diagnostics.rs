/*!
 * Fatal Trap Diagnostics
 *
 * Everything the test console gets to see before an unroutable trap kills
 * the process: privilege level, vector, syndrome class, fault address
 * with its validity tag, and the full register dump.
 */

use super::frame::TrapFrame;
use super::types::{class_label, far_is_valid, Esr, Vector};
use crate::core::types::ExceptionLevel;
use log::error;

/// Diagnostic record for an unroutable trap
#[derive(Debug, Clone)]
pub struct TrapReport {
    pub level: ExceptionLevel,
    pub vector: Vector,
    pub esr: Esr,
    /// False for IRQ-path fatals, where the syndrome carries nothing useful
    pub esr_valid: bool,
    /// True when the vector itself had no dispatch semantics at all
    pub bad_vector: bool,
    pub far: u64,
    pub far_valid: bool,
    pub frame: TrapFrame,
}

impl TrapReport {
    pub fn new(
        level: ExceptionLevel,
        vector: Vector,
        frame: &TrapFrame,
        esr: Esr,
        esr_valid: bool,
        bad_vector: bool,
    ) -> Self {
        Self {
            level,
            vector,
            esr,
            esr_valid,
            bad_vector,
            far: frame.far,
            far_valid: far_is_valid(esr),
            frame: *frame,
        }
    }

    /// Full diagnostic text, in console order
    pub fn render(&self) -> String {
        let mut out = String::new();
        let class = self.esr.class_code();

        out.push_str(&format!("CurrentEL: {}\n", self.level));

        if self.bad_vector {
            out.push_str(&format!("Unhandled vector {}\n", self.vector));
        } else if self.esr_valid {
            out.push_str(&format!(
                "Unhandled exception ec={:#x} ({})\n",
                class,
                class_label(class)
            ));
        }

        out.push_str(&format!("Vector: {}\n", self.vector));
        out.push_str(&format!(
            "ESR_ELx: {:8}{:08x}, ec={:#x} ({})\n",
            "",
            self.esr.bits(),
            class,
            class_label(class)
        ));
        out.push_str(&format!(
            "FAR_ELx: {:016x} ({}valid)\n",
            self.far,
            if self.far_valid { "" } else { "not " }
        ));
        out.push_str("Exception frame registers:\n");
        out.push_str(&self.frame.dump());
        out
    }

    /// Emit the diagnostic and terminate with a non-zero status.
    ///
    /// The trapping core does not resume; there is no recovery model for
    /// a trap nothing claimed.
    pub fn die(&self) -> ! {
        let text = self.render();
        for line in text.lines() {
            error!("{}", line);
        }
        eprint!("{}", text);
        std::process::abort();
    }
}
