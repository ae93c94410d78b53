mod event_types;

pub use event_types::*;

/// Gradient axis an event plays out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientChannel {
    X,
    Y,
    Z,
}

/// Anything that can be placed into a sequence block.
#[derive(Debug, Clone)]
pub enum Event {
    Rf(Rf),
    Gradient(Gradient),
    Adc(Adc),
    Delay(Delay),
}

impl Event {
    /// Time from block start until the event is over, including delays,
    /// dead and ringdown times.
    pub fn duration(&self) -> f64 {
        match self {
            Event::Rf(rf) => rf.duration(),
            Event::Gradient(grad) => grad.duration(),
            Event::Adc(adc) => adc.duration(),
            Event::Delay(delay) => delay.duration,
        }
    }
}

impl From<Rf> for Event {
    fn from(rf: Rf) -> Self {
        Event::Rf(rf)
    }
}

impl From<Gradient> for Event {
    fn from(grad: Gradient) -> Self {
        Event::Gradient(grad)
    }
}

impl From<Adc> for Event {
    fn from(adc: Adc) -> Self {
        Event::Adc(adc)
    }
}

impl From<Delay> for Event {
    fn from(delay: Delay) -> Self {
        Event::Delay(delay)
    }
}

/// Duration of a block containing the given events: the longest of them.
pub fn calc_duration<'a, I>(events: I) -> f64
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .map(Event::duration)
        .fold(0.0, f64::max)
}
