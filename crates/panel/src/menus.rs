/// Open/closed state of the three dropdowns.
///
/// The stratagem and profile menus are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Menus {
    pub stratagems: bool,
    pub profiles: bool,
    pub users: bool,
}

impl Menus {
    pub fn toggle_stratagems(&mut self) -> bool {
        self.stratagems = !self.stratagems;
        if self.stratagems {
            self.profiles = false;
        }
        self.stratagems
    }

    pub fn toggle_profiles(&mut self) -> bool {
        self.profiles = !self.profiles;
        if self.profiles {
            self.stratagems = false;
        }
        self.profiles
    }

    pub fn toggle_users(&mut self) -> bool {
        self.users = !self.users;
        self.users
    }

    /// Closes the grid menus when remove mode starts.
    pub fn close_grid_menus(&mut self) {
        self.stratagems = false;
        self.profiles = false;
    }

    /// Closes everything; returns whether anything was open.
    pub fn close_all(&mut self) -> bool {
        let was_open = self.any_open();
        *self = Menus::default();
        was_open
    }

    pub fn any_open(&self) -> bool {
        self.stratagems || self.profiles || self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_menus_are_exclusive() {
        let mut m = Menus::default();
        m.toggle_stratagems();
        assert!(m.toggle_profiles());
        assert!(!m.stratagems);
        assert!(m.toggle_stratagems());
        assert!(!m.profiles);
    }

    #[test]
    fn user_menu_is_independent() {
        let mut m = Menus::default();
        m.toggle_users();
        m.toggle_stratagems();
        assert!(m.users && m.stratagems);
        m.close_grid_menus();
        assert!(m.users && !m.stratagems);
        assert!(m.close_all());
        assert!(!m.close_all());
    }
}
