//! User-facing message texts.

pub const START: &str = "Hi! I keep track of your weight.\n\n\
    Just send me a number like 72.5 and I'll remember it, or use /help to see \
    everything I can do.";

pub const HELP: &str = "Commands:\n\
    /setweight <kg> (or /sw) - record your current weight\n\
    /getweight (or /gw) - show your last recorded weight\n\
    /invite - get an invite link to the group\n\
    /on - receive weekly weigh-in reminders\n\
    /off - stop weekly weigh-in reminders\n\
    /faq - frequently asked questions\n\
    /help - this message\n\n\
    In a private chat you can also just send the number.";

pub const FAQ: &str = "FAQ\n\n\
    When should I weigh myself?\n\
    Once a week, in the morning, before breakfast. The group gets a reminder \
    every week.\n\n\
    Who can see my weight?\n\
    Only you. The bot answers weight commands in the chat you ask from, so \
    use a private chat if you want to keep it to yourself.\n\n\
    I made a typo, what now?\n\
    Just send the correct value again, the latest one counts.";

pub const UNKNOWN_COMMAND: &str =
    "I don't know that command (凸ಠ益ಠ)凸\nSend /help to see what I can do";

pub const SETWEIGHT_USAGE: &str =
    "Usage: /setweight <kg>, for example /setweight 72.5\n\
     The weight must be a number between 20 and 500.";

pub const FREEFORM_PROMPT: &str =
    "I didn't get that. Send me your weight as a number, for example 72.5, \
     or use /help to see the commands.";

pub const NO_DATA: &str = "You haven't recorded any weight yet. Send /setweight <kg> to start.";

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

pub const NOTIFY_ON: &str = "Weekly reminders are on.";

pub const NOTIFY_OFF: &str = "Weekly reminders are off. Send /on to turn them back on.";

pub const NOTIFY_ALREADY_ON: &str = "Weekly reminders were already on.";

pub const NOTIFY_ALREADY_OFF: &str = "Weekly reminders were already off.";

pub const WEEKLY_REMINDER: &str =
    "Time to weigh in! ⚖️\nStep on the scale and send me the number with /setweight.";

pub fn weight_saved(value: f64) -> String {
    format!("Got it, {} kg saved.", format_kg(value))
}

pub fn current_weight(value: f64, date: &str, change: Option<f64>) -> String {
    let mut text = format!("Your weight: {} kg (recorded {})", format_kg(value), date);
    if let Some(change) = change {
        text.push_str(&format!(
            "\nChange since the previous entry: {}{} kg",
            if change > 0.0 { "+" } else { "" },
            format_kg(change)
        ));
    }
    text
}

pub fn invite(link: &str) -> String {
    format!("Join the group: {}", link)
}

/// Format kilograms with at most one decimal place, dropping a trailing `.0`
pub fn format_kg(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        "0".to_string()
    } else if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
