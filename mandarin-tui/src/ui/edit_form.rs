use std::path::PathBuf;

use chrono::NaiveDate;
use mandarin_core::edit::{EditForm, ImageSource};
use mandarin_core::{Gender, IntroFields, ProfileViewModel};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Theme;

/// Choices cycled by ←/→ on the gender row.
const GENDER_CHOICES: [Option<&str>; 3] = [
    None,
    Some(Gender::Male.label()),
    Some(Gender::Female.label()),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Image,
    Username,
    Accountname,
    Intro,
    Pet,
    Gender,
    Birthdate,
    Location,
}

impl EditField {
    pub const ALL: [EditField; 8] = [
        Self::Image,
        Self::Username,
        Self::Accountname,
        Self::Intro,
        Self::Pet,
        Self::Gender,
        Self::Birthdate,
        Self::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "Image (URL or local file)",
            Self::Username => "Username",
            Self::Accountname => "Account ID",
            Self::Intro => "Intro",
            Self::Pet => "Pet",
            Self::Gender => "Gender",
            Self::Birthdate => "Birthdate (YYYY-MM-DD)",
            Self::Location => "Location",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Single-line text input; `cursor` counts chars, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

pub struct EditState {
    pub focused: EditField,
    pub image: TextInput,
    pub username: TextInput,
    pub accountname: TextInput,
    pub intro: TextInput,
    pub pet: TextInput,
    pub gender: Option<String>,
    pub birthdate: TextInput,
    pub location: TextInput,
    /// Tags this client does not edit; carried so the prefill is faithful.
    extra: Vec<(String, String)>,
    /// Hosted image the profile had when the form opened.
    original_image: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl EditState {
    pub fn from_view(view: &ProfileViewModel) -> Self {
        let form = EditForm::from_view(view);
        let fields = form.fields;
        let original_image = match form.image {
            ImageSource::Remote(url) => url,
            _ => String::new(),
        };
        Self {
            focused: EditField::Username,
            image: TextInput::new(original_image.clone()),
            username: TextInput::new(form.username),
            accountname: TextInput::new(form.accountname),
            intro: TextInput::new(fields.intro),
            pet: TextInput::new(fields.pet.unwrap_or_default()),
            gender: fields.gender,
            birthdate: TextInput::new(fields.birthdate.unwrap_or_default()),
            location: TextInput::new(fields.location.unwrap_or_default()),
            extra: fields.extra,
            original_image,
            error: None,
            submitting: false,
        }
    }

    /// Text input under focus; the gender row is a picker and has none.
    pub fn current_input(&mut self) -> Option<&mut TextInput> {
        match self.focused {
            EditField::Image => Some(&mut self.image),
            EditField::Username => Some(&mut self.username),
            EditField::Accountname => Some(&mut self.accountname),
            EditField::Intro => Some(&mut self.intro),
            EditField::Pet => Some(&mut self.pet),
            EditField::Gender => None,
            EditField::Birthdate => Some(&mut self.birthdate),
            EditField::Location => Some(&mut self.location),
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }

    pub fn cycle_gender(&mut self, forward: bool) {
        let len = GENDER_CHOICES.len();
        let current = GENDER_CHOICES
            .iter()
            .position(|choice| *choice == self.gender.as_deref());
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            // unrecognised label from another client
            (None, true) => 1,
            (None, false) => len - 1,
        };
        self.gender = GENDER_CHOICES[next].map(str::to_string);
    }

    /// Where the avatar comes from: unchanged, another URL, or a local file.
    pub fn image_source(&self) -> ImageSource {
        let text = self.image.text.trim();
        if text.is_empty() {
            ImageSource::None
        } else if text == self.original_image
            || text.starts_with("http://")
            || text.starts_with("https://")
        {
            ImageSource::Remote(text.to_string())
        } else {
            ImageSource::Local(expand_home(text))
        }
    }

    /// Builds the submission, rejecting input the server would not accept.
    pub fn to_form(&self) -> Result<EditForm, String> {
        let birthdate = non_empty(&self.birthdate.text);
        if let Some(date) = &birthdate {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| format!("Birthdate must be YYYY-MM-DD, got {date:?}"))?;
        }

        let form = EditForm {
            username: self.username.text.trim().to_string(),
            accountname: self.accountname.text.trim().to_string(),
            fields: IntroFields {
                intro: self.intro.text.trim().to_string(),
                pet: non_empty(&self.pet.text),
                gender: self.gender.clone(),
                birthdate,
                location: non_empty(&self.location.text),
                extra: self.extra.clone(),
            },
            image: self.image_source(),
        };
        form.validate().map_err(|e| e.to_string())?;
        Ok(form)
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &EditState) {
    let form_height = (EditField::ALL.len() * 3 + 5) as u16;
    let v_pad = area.height.saturating_sub(form_height) / 2;
    let v_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(v_pad),
            Constraint::Length(form_height),
            Constraint::Min(0),
        ])
        .split(area);

    let form_width = 56u16.min(area.width.saturating_sub(4));
    let h_pad = area.width.saturating_sub(form_width) / 2;
    let h_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(h_pad),
            Constraint::Length(form_width),
            Constraint::Min(0),
        ])
        .split(v_layout[1]);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "EDIT PROFILE",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for field in EditField::ALL {
        let focused = !state.submitting && state.focused == field;
        let label_style = if focused {
            Theme::highlight()
        } else {
            Theme::secondary()
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));

        let row = match field {
            EditField::Gender => build_gender_line(state.gender.as_deref(), focused),
            EditField::Image => build_input_line(&state.image, focused),
            EditField::Username => build_input_line(&state.username, focused),
            EditField::Accountname => build_input_line(&state.accountname, focused),
            EditField::Intro => build_input_line(&state.intro, focused),
            EditField::Pet => build_input_line(&state.pet, focused),
            EditField::Birthdate => build_input_line(&state.birthdate, focused),
            EditField::Location => build_input_line(&state.location, focused),
        };
        lines.push(row);
        lines.push(Line::from(""));
    }

    if state.submitting {
        let message = if state.image_source().needs_upload() {
            "Uploading image and saving..."
        } else {
            "Saving..."
        };
        lines.push(Line::from(Span::styled(message, Theme::active())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("[Enter]", Theme::highlight()),
            Span::raw(" Save  "),
            Span::styled("[Esc]", Theme::secondary()),
            Span::raw(" Cancel"),
        ]));
    }

    if let Some(err) = &state.error {
        lines.push(Line::from(Span::styled(err.as_str(), Theme::error())));
    }

    frame.render_widget(Paragraph::new(lines), h_layout[1]);
}

/// `> content` with the cursor drawn as a reversed cell.
fn build_input_line(input: &TextInput, is_focused: bool) -> Line<'static> {
    let prefix = if is_focused { "> " } else { "  " };

    if is_focused {
        let before: String = input.text.chars().take(input.cursor).collect();
        let cursor_char: String = input
            .text
            .chars()
            .nth(input.cursor)
            .map_or(" ".to_string(), |c| c.to_string());
        let after: String = input.text.chars().skip(input.cursor + 1).collect();

        Line::from(vec![
            Span::styled(prefix.to_string(), Theme::active()),
            Span::raw(before),
            Span::styled(
                cursor_char,
                Style::default().add_modifier(Modifier::REVERSED),
            ),
            Span::raw(after),
        ])
    } else {
        Line::from(vec![
            Span::styled(prefix.to_string(), Theme::secondary()),
            Span::styled(input.text.clone(), Theme::secondary()),
        ])
    }
}

fn build_gender_line(gender: Option<&str>, is_focused: bool) -> Line<'static> {
    let value = gender.unwrap_or("-").to_string();
    if is_focused {
        Line::from(vec![
            Span::styled("> ".to_string(), Theme::active()),
            Span::styled("◀ ".to_string(), Theme::secondary()),
            Span::styled(value, Theme::highlight()),
            Span::styled(" ▶".to_string(), Theme::secondary()),
        ])
    } else {
        Line::from(vec![
            Span::styled("  ".to_string(), Theme::secondary()),
            Span::styled(value, Theme::secondary()),
        ])
    }
}
