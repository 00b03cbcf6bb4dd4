use super::*;
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for InteriorPointInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

impl<T> InteriorPointInfo<T>
where
    T: FloatT,
{
    pub(crate) fn print_configuration(
        &mut self,
        settings: &InteriorPointSettings<T>,
        dims: (usize, usize, usize),
        linsolver: &str,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;
        let (n, m_eq, m_ineq) = dims;

        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(
            out,
            "      ipoa v{}  -  primal-dual interior point NLP solver",
            crate::VERSION
        )?;
        writeln!(out, "-------------------------------------------------------------")?;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables              = {}", n)?;
        writeln!(out, "  equality constraints   = {}", m_eq)?;
        writeln!(out, "  inequality constraints = {}", m_ineq)?;
        writeln!(out)?;

        let time_lim_str = if settings.time_limit.is_infinite() {
            "Inf".to_string()
        } else {
            format!("{:?}", settings.time_limit)
        };

        writeln!(out, "settings:")?;
        writeln!(out, "  linear algebra: direct / {}", linsolver)?;
        writeln!(
            out,
            "  max iter = {}, time limit = {}, tol = {:.1e}",
            settings.max_iter, time_lim_str, settings.tol
        )?;
        writeln!(
            out,
            "  barrier: μ0 = {:.1e}, μmin = {:.1e}, τmin = {:.2}",
            settings.mu_init, settings.mu_min, settings.tau_min
        )?;
        writeln!(
            out,
            "  regularization: {}, δ0 = {:.1e}, growth = {:.0}, max iter = {}, inertia = {}",
            _bool_on_off(settings.regularize_kkt),
            settings.regularization_initial,
            settings.regularization_growth,
            settings.regularization_max_iter,
            _bool_on_off(settings.compute_inertia),
        )?;
        writeln!(out)?;

        Ok(())
    }

    pub(crate) fn print_status_header(
        &mut self,
        settings: &InteriorPointSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        write!(out, "iter    ")?;
        write!(out, "objective     ")?;
        write!(out, "pinf      ")?;
        write!(out, "dinf      ")?;
        write!(out, "compl     ")?;
        write!(out, " μ        ")?;
        write!(out, "α_pr      ")?;
        write!(out, "α_du      ")?;
        write!(out, "reg       ")?;
        writeln!(out)?;
        writeln!(
            out,
            "---------------------------------------------------------------------------------------------"
        )?;
        out.flush()?;
        Ok(())
    }

    pub(crate) fn print_status(&mut self, settings: &InteriorPointSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>4}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.objective))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.primal_inf))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.dual_inf))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.complementarity))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.μ))?;

        if self.iterations > 0 {
            write!(out, "{}  ", expformat!("{:>.2e}", self.step_primal))?;
            write!(out, "{}  ", expformat!("{:>.2e}", self.step_dual))?;
            if self.regularization > T::zero() {
                write!(out, "{}", expformat!("{:>.1e}", self.regularization))?;
            } else {
                write!(out, "  -")?;
            }
        } else {
            write!(out, " ------    ------      -")?;
        }

        writeln!(out)?;

        Ok(())
    }

    pub(crate) fn print_footer(&mut self, settings: &InteriorPointSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        writeln!(
            out,
            "---------------------------------------------------------------------------------------------"
        )?;

        writeln!(out, "Terminated with status = {}", self.status)?;

        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;

        out.flush()
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

// pad single digit exponents, i.e. "1.0e-8" becomes "1.0e-08"
fn _exp_str_reformat(thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let (mantissa, exponent) = thestr.split_at(eidx + 1);
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("+", exponent),
    };
    if digits.len() < 2 {
        format!("{}{}0{}", mantissa, sign, digits)
    } else {
        format!("{}{}{}", mantissa, sign, digits)
    }
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat("1.00e-8".to_string()), "1.00e-08");
    assert_eq!(_exp_str_reformat("+2.5000e3".to_string()), "+2.5000e+03");
    assert_eq!(_exp_str_reformat("1.00e-10".to_string()), "1.00e-10");
    assert_eq!(_exp_str_reformat("inf".to_string()), "inf");
}
