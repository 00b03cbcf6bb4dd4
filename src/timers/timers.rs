use std::collections::HashMap;
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    suspended: bool,
    subtimers: HashMap<&'static str, InnerTimer>,
}

impl InnerTimer {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.suspended = false;
        self.subtimers.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
        self.suspended = false;
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            if !self.suspended {
                self.elapsed += instant.elapsed();
            }
        }
        self.suspended = false;
    }

    // bank the running time and pause, keeping the
    // timer marked as active so that resume restarts it
    fn suspend(&mut self) {
        if let (Some(instant), false) = (self.start, self.suspended) {
            self.elapsed += instant.elapsed();
            self.suspended = true;
            self.subtimers.values_mut().for_each(InnerTimer::suspend);
        }
    }

    fn resume(&mut self) {
        if self.start.is_some() && self.suspended {
            self.start = Some(Instant::now());
            self.suspended = false;
            self.subtimers.values_mut().for_each(InnerTimer::resume);
        }
    }

    // elapsed time including any currently running interval
    fn elapsed(&self) -> Duration {
        match self.start {
            Some(instant) if !self.suspended => self.elapsed + instant.elapsed(),
            _ => self.elapsed,
        }
    }

    fn print(&self, out: &mut dyn Write, key: &str, depth: usize) -> std::io::Result<()> {
        let tabs = format!("{: <1$}", "", 4 * depth);
        writeln!(out, "{}{} : {:?}", tabs, key, self.elapsed())?;
        for (key, t) in self.subtimers.iter() {
            t.print(out, key, depth + 1)?;
        }
        Ok(())
    }
}

/// A stack of named, nested timers.
///
/// Starting a timer while another is active makes it a child of
/// the active timer.  Times are only reported for completed or
/// running intervals; suspended intervals are excluded.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    subtimers: HashMap<&'static str, InnerTimer>,
}

impl Timers {
    fn active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;
        let mut active = self.subtimers.get_mut(first)?;
        for key in rest {
            active = active.subtimers.get_mut(key)?;
        }
        Some(active)
    }

    pub fn reset_timer(&mut self, key: &'static str) {
        self.subtimers.entry(key).or_default().reset();
    }

    /// starts a timer with name `key` as the current timer
    pub fn start_as_current(&mut self, key: &'static str) {
        match self.active_timer() {
            Some(active) => active.subtimers.entry(key).or_default().start(),
            None => self.subtimers.entry(key).or_default().start(),
        }
        self.stack.push(key);
    }

    /// stops the current timer.  Does nothing if no timer is active
    pub fn stop_current(&mut self) {
        if let Some(active) = self.active_timer() {
            active.stop();
            self.stack.pop();
        }
    }

    // suspend every timer in the collection.   Used for notimeit!
    pub fn suspend(&mut self) {
        self.subtimers.values_mut().for_each(InnerTimer::suspend);
    }

    // resume every timer in the collection.   Used for notimeit!
    pub fn resume(&mut self) {
        self.subtimers.values_mut().for_each(InnerTimer::resume);
    }

    /// Elapsed time of a top level timer, including a running interval.
    /// Returns zero for a timer that was never started.
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.subtimers
            .get(key)
            .map_or(Duration::ZERO, InnerTimer::elapsed)
    }

    pub fn total_time(&self) -> Duration {
        self.subtimers
            .values()
            .fold(Duration::ZERO, |acc, t| acc + t.elapsed())
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for (key, t) in self.subtimers.iter() {
            t.print(out, key, 0)?;
        }
        Ok(())
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:ident; $($tt:tt)+) => {

        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_timers() {
        let mut timers = Timers::default();
        timeit! {timers => "outer";
            std::thread::sleep(Duration::from_millis(2));
            timeit!{timers => "inner";
                std::thread::sleep(Duration::from_millis(2));
            }
        }
        assert!(timers.elapsed("outer") >= Duration::from_millis(4));
        assert_eq!(timers.elapsed("inner"), Duration::ZERO);
        assert_eq!(timers.total_time(), timers.elapsed("outer"));

        let mut buf = Vec::new();
        timers.print(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("outer"));
        assert!(text.contains("    inner"));
    }

    #[test]
    fn test_suspended_time_excluded() {
        let mut timers = Timers::default();
        timers.start_as_current("main");
        notimeit! {timers;
            std::thread::sleep(Duration::from_millis(20));
        }
        timers.stop_current();
        assert!(timers.elapsed("main") < Duration::from_millis(20));

        timers.reset_timer("main");
        assert_eq!(timers.elapsed("main"), Duration::ZERO);
    }
}
