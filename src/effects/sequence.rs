use std::sync::Arc;
use std::time::Duration;

use super::MotionLevel;
use crate::config::EffectsConfig;
use crate::scheduler::{Scheduler, TimerGroup};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypewriterFrame {
    pub at: Duration,
    pub text: String,
}

/// Types a greeting one character at a time.
#[derive(Clone, Debug)]
pub struct Typewriter {
    text: String,
    start_delay: Duration,
    interval: Duration,
    motion: MotionLevel,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, config: &EffectsConfig) -> Self {
        Self {
            text: text.into(),
            start_delay: config.typing_start_delay(),
            interval: config.typing_char_interval(),
            motion: config.motion,
        }
    }

    pub fn frames(&self) -> Vec<TypewriterFrame> {
        if self.text.is_empty() {
            return Vec::new();
        }
        if !self.motion.animates() {
            return vec![TypewriterFrame {
                at: Duration::ZERO,
                text: self.text.clone(),
            }];
        }
        self.text
            .char_indices()
            .map(|(offset, ch)| offset + ch.len_utf8())
            .enumerate()
            .map(|(index, end)| TypewriterFrame {
                at: self.start_delay.saturating_add(step(self.interval, index)),
                text: self.text[..end].to_string(),
            })
            .collect()
    }

    pub fn duration(&self) -> Duration {
        self.frames()
            .last()
            .map(|frame| frame.at)
            .unwrap_or_default()
    }

    /// Clears the target right away, then schedules every frame. Cancel the
    /// returned group to stop typing. Without motion the full text is shown
    /// at once and nothing is scheduled.
    pub fn play<F>(&self, scheduler: &dyn Scheduler, sink: F) -> TimerGroup
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut timers = TimerGroup::new();
        if !self.motion.animates() {
            sink(&self.text);
            return timers;
        }

        let sink = Arc::new(sink);
        sink("");
        for frame in self.frames() {
            let sink = sink.clone();
            timers.push(scheduler.schedule(frame.at, Box::new(move || sink(&frame.text))));
        }
        tracing::trace!(frames = timers.len(), "typewriter scheduled");
        timers
    }
}

/// Staggered reveal of skill progress bars.
#[derive(Clone, Copy, Debug)]
pub struct SkillReveal {
    stagger: Duration,
    motion: MotionLevel,
}

impl SkillReveal {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            stagger: config.skill_stagger(),
            motion: config.motion,
        }
    }

    pub fn delay_for(&self, index: usize) -> Duration {
        if self.motion.animates() {
            step(self.stagger, index)
        } else {
            Duration::ZERO
        }
    }

    /// Collapses every bar to zero, then restores bar `i` after its stagger.
    /// Without motion the bars are set to their widths immediately.
    pub fn play<F>(&self, scheduler: &dyn Scheduler, widths: &[f32], sink: F) -> TimerGroup
    where
        F: Fn(usize, f32) + Send + Sync + 'static,
    {
        let mut timers = TimerGroup::new();
        if !self.motion.animates() {
            for (index, width) in widths.iter().copied().enumerate() {
                sink(index, width);
            }
            return timers;
        }

        let sink = Arc::new(sink);
        for index in 0..widths.len() {
            sink(index, 0.0);
        }
        for (index, width) in widths.iter().copied().enumerate() {
            let sink = sink.clone();
            timers.push(scheduler.schedule(
                self.delay_for(index),
                Box::new(move || sink(index, width)),
            ));
        }
        timers
    }
}

// `interval * index`, saturating instead of overflowing.
fn step(interval: Duration, index: usize) -> Duration {
    interval.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use std::sync::Mutex;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn frames_start_after_delay_and_step_per_char() {
        let typewriter = Typewriter::new("Hi!", &EffectsConfig::default());
        let frames = typewriter
            .frames()
            .into_iter()
            .map(|frame| (frame.at, frame.text))
            .collect::<Vec<_>>();
        assert_eq!(
            frames,
            vec![
                (ms(500), "H".to_string()),
                (ms(600), "Hi".to_string()),
                (ms(700), "Hi!".to_string()),
            ]
        );
        assert_eq!(typewriter.duration(), ms(700));
    }

    #[test]
    fn frames_respect_char_boundaries() {
        let typewriter = Typewriter::new("héllo ✨", &EffectsConfig::default());
        let frames = typewriter.frames();
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[1].text, "hé");
        assert_eq!(frames[6].text, "héllo ✨");
    }

    #[test]
    fn typewriter_without_motion_shows_full_text() {
        let config = EffectsConfig {
            motion: MotionLevel::None,
            ..EffectsConfig::default()
        };
        let frames = Typewriter::new("Hello", &config).frames();
        assert_eq!(
            frames,
            vec![TypewriterFrame {
                at: Duration::ZERO,
                text: "Hello".to_string()
            }]
        );
    }

    #[test]
    fn typewriter_without_motion_plays_immediately() {
        let config = EffectsConfig {
            motion: MotionLevel::None,
            ..EffectsConfig::default()
        };
        let scheduler = ManualScheduler::new();
        let shown = Arc::new(Mutex::new(Vec::new()));
        let target = shown.clone();
        let timers = Typewriter::new("Hello", &config).play(&scheduler, move |text: &str| {
            target.lock().expect("target").push(text.to_string())
        });

        assert!(timers.is_empty());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(*shown.lock().expect("shown"), vec!["Hello".to_string()]);
    }

    #[test]
    fn huge_intervals_saturate() {
        let config = EffectsConfig {
            typing_char_interval_ms: u64::MAX,
            skill_stagger_ms: u64::MAX,
            ..EffectsConfig::default()
        };
        let reveal = SkillReveal::new(&config);
        assert_eq!(reveal.delay_for(5_000), Duration::MAX);
        assert_eq!(reveal.delay_for(usize::MAX), Duration::MAX);

        let frames = Typewriter::new("x".repeat(2_000), &config).frames();
        assert_eq!(frames.len(), 2_000);
        assert_eq!(frames[0].at, ms(500));
        assert_eq!(frames[1_999].at, Duration::MAX);
    }

    #[test]
    fn typewriter_plays_through_scheduler_and_can_stop() {
        let scheduler = ManualScheduler::new();
        let shown = Arc::new(Mutex::new(String::from("stale")));
        let target = shown.clone();
        let timers = Typewriter::new("Hey", &EffectsConfig::default()).play(
            &scheduler,
            move |text: &str| *target.lock().expect("target") = text.to_string(),
        );

        assert_eq!(*shown.lock().expect("shown"), "");
        scheduler.advance(ms(600));
        assert_eq!(*shown.lock().expect("shown"), "He");

        timers.cancel_all();
        scheduler.advance(ms(1_000));
        assert_eq!(*shown.lock().expect("shown"), "He");
    }

    #[test]
    fn skill_bars_collapse_then_stagger_back() {
        let scheduler = ManualScheduler::new();
        let widths = Arc::new(Mutex::new(vec![90.0_f32, 75.0, 60.0]));
        let target = widths.clone();
        let timers = SkillReveal::new(&EffectsConfig::default()).play(
            &scheduler,
            &[90.0, 75.0, 60.0],
            move |index, width| target.lock().expect("widths")[index] = width,
        );

        assert_eq!(timers.len(), 3);
        assert_eq!(*widths.lock().expect("widths"), vec![0.0, 0.0, 0.0]);
        scheduler.advance(Duration::ZERO);
        assert_eq!(*widths.lock().expect("widths"), vec![90.0, 0.0, 0.0]);
        scheduler.advance(ms(200));
        assert_eq!(*widths.lock().expect("widths"), vec![90.0, 75.0, 0.0]);
        scheduler.advance(ms(200));
        assert_eq!(*widths.lock().expect("widths"), vec![90.0, 75.0, 60.0]);
    }

    #[test]
    fn skill_bars_without_motion_apply_immediately() {
        let config = EffectsConfig {
            motion: MotionLevel::None,
            ..EffectsConfig::default()
        };
        let scheduler = ManualScheduler::new();
        let applied = Arc::new(Mutex::new(Vec::new()));
        let target = applied.clone();
        let timers = SkillReveal::new(&config).play(&scheduler, &[40.0, 80.0], move |i, w| {
            target.lock().expect("applied").push((i, w))
        });

        assert!(timers.is_empty());
        assert_eq!(*applied.lock().expect("applied"), vec![(0, 40.0), (1, 80.0)]);
        assert_eq!(SkillReveal::new(&config).delay_for(5), Duration::ZERO);
    }
}
