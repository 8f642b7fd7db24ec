//! User-facing texts.
//!
//! Injected into the state machine so deployments can reword prompts without
//! touching transition logic.

/// Every text the conversation can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub welcome: String,
    pub critics_option: String,
    pub game_option: String,
    pub cancel_option: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub registered: String,
    pub pick_program: String,
    pub send_critique: String,
    pub program_label: String,
    pub saved: String,
    pub show_id: String,
    pub game_prompt: String,
    pub game_registered: String,
    pub cancelled: String,
    pub error: String,
    pub text_voice: String,
    pub register_first: String,
    pub empty_input: String,
    pub text_only: String,
    pub choose_option: String,
    pub invalid_selection: String,
    pub unknown_command: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            welcome: "🏆 Welcome to the TV Channel Bot! Choose:".to_owned(),
            critics_option: "🎬 Critics Section".to_owned(),
            game_option: "🎮 Game Registration".to_owned(),
            cancel_option: "❌ Cancel".to_owned(),
            first_name: "📝 Send your FIRST name:".to_owned(),
            last_name: "✅ First name saved! Send your LAST name:".to_owned(),
            phone: "✅ Last name saved! Send your PHONE number:".to_owned(),
            registered: "🎉 Registered! Now pick a program:".to_owned(),
            pick_program: "🔍 Select a TV program to critique:".to_owned(),
            send_critique: "✍️ Send your critique as text or voice:".to_owned(),
            program_label: "Program:".to_owned(),
            saved: "✅ Critique received!".to_owned(),
            show_id: "🎫 Your critique ID is".to_owned(),
            game_prompt: "🎮 Send the player name you want to register:".to_owned(),
            game_registered: "🎉 You're registered for the game!".to_owned(),
            cancelled: "❌ Operation cancelled.".to_owned(),
            error: "❌ Unexpected error, please try again later.".to_owned(),
            text_voice: "❌ Send either text or a voice message, not both.".to_owned(),
            register_first: "❌ Please register first.".to_owned(),
            empty_input: "❌ That was empty, please try again.".to_owned(),
            text_only: "❌ Please reply with text.".to_owned(),
            choose_option: "👇 Please choose one of the options.".to_owned(),
            invalid_selection: "❌ That is not one of the listed programs.".to_owned(),
            unknown_command: "❓ Unknown command. Use /start or /cancel.".to_owned(),
        }
    }
}
