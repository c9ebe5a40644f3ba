use rental_core::form::{
    Form, CAR_FIELDS, CUSTOMER_FIELDS, DUE_DATE_FIELDS, USER_FIELDS,
};

const MAX_INPUT_LEN: usize = 96;

/// Data-entry sequences reachable from the login screen and the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Login,
    ListCars,
    AddCar,
    MoveCar,
    AddCustomer,
    AddUser,
    NewContract,
    ArchiveContract,
}

impl Flow {
    pub fn title(self) -> &'static str {
        match self {
            Flow::Login => "Login",
            Flow::ListCars => "List cars",
            Flow::AddCar => "Add car",
            Flow::MoveCar => "Move car",
            Flow::AddCustomer => "Add customer",
            Flow::AddUser => "Add user",
            Flow::NewContract => "New contract",
            Flow::ArchiveContract => "Archive contract",
        }
    }

    pub fn labels(self) -> Vec<&'static str> {
        match self {
            Flow::Login => vec!["Username", "Password"],
            Flow::ListCars => vec!["Category (1-4)"],
            Flow::AddCar => std::iter::once("Category (1-4)")
                .chain(CAR_FIELDS)
                .collect(),
            Flow::MoveCar => vec!["From category (1-4)", "License plate", "To category (1-4)"],
            Flow::AddCustomer => CUSTOMER_FIELDS.to_vec(),
            Flow::AddUser => USER_FIELDS.to_vec(),
            Flow::NewContract => ["License plate", "Customer phone"]
                .into_iter()
                .chain(DUE_DATE_FIELDS)
                .collect(),
            Flow::ArchiveContract => vec!["Contract name"],
        }
    }

    /// Index of the first due-date component in [`Flow::NewContract`].
    pub const DUE_DATE_OFFSET: usize = 2;

    fn masks(self, index: usize) -> bool {
        matches!(self, Flow::Login) && index == 1
    }
}

/// Single-line text input with a cursor counted in characters.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    input: String,
    cursor: usize,
}

impl TextInput {
    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map_or(self.input.len(), |(offset, _)| offset)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.char_count() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn insert(&mut self, ch: char) {
        if self.char_count() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.input.insert(offset, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let offset = self.byte_offset(self.cursor);
            self.input.remove(offset);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let offset = self.byte_offset(self.cursor);
            self.input.remove(offset);
        }
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Modal collecting the fields of one [`Flow`].
#[derive(Debug, Clone)]
pub struct Prompt {
    pub flow: Flow,
    pub form: Form,
    pub input: TextInput,
    pub error: Option<String>,
}

impl Prompt {
    pub fn new(flow: Flow, cancel_token: &str) -> Self {
        Self {
            flow,
            form: Form::new(flow.labels(), cancel_token),
            input: TextInput::default(),
            error: None,
        }
    }

    /// Text shown in the input line.
    pub fn display_value(&self) -> String {
        if self.flow.masks(self.form.position()) {
            "*".repeat(self.input.value().chars().count())
        } else {
            self.input.value().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_core::form::{FormStep, CANCEL_TOKEN};

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::default();
        for ch in "AB12".chars() {
            input.insert(ch);
        }
        input.move_cursor(-2);
        input.insert('-');
        assert_eq!(input.value(), "AB-12");
        input.move_home();
        input.delete();
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "B-1");
        assert_eq!(input.take(), "B-1");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn accented_letters_are_accepted() {
        let mut input = TextInput::default();
        for ch in "Novk".chars() {
            input.insert(ch);
        }
        input.move_cursor(-1);
        input.insert('á');
        assert_eq!(input.value(), "Novák");
        input.move_end();
        input.backspace();
        input.backspace();
        assert_eq!(input.value(), "Nov");
        input.insert('\u{7}');
        assert_eq!(input.value(), "Nov");
    }

    #[test]
    fn flows_cover_record_fields() {
        assert_eq!(Flow::AddCar.labels().len(), CAR_FIELDS.len() + 1);
        assert_eq!(
            Flow::NewContract.labels()[Flow::DUE_DATE_OFFSET],
            DUE_DATE_FIELDS[0]
        );
    }

    #[test]
    fn password_is_masked() {
        let mut prompt = Prompt::new(Flow::Login, CANCEL_TOKEN);
        assert_eq!(prompt.form.submit("anna"), FormStep::Next);
        for ch in "pw".chars() {
            prompt.input.insert(ch);
        }
        assert_eq!(prompt.display_value(), "**");
    }
}
