/// Contents of a generated `index.theme`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexTheme {
    pub name: String,
    pub comment: String,
    pub inherits: String,
}

impl IndexTheme {
    pub fn for_theme(name: &str) -> Self {
        Self {
            name: name.to_string(),
            comment: format!("{} cursor theme", name),
            inherits: "hicolor".to_string(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "[Icon Theme]\n\
             Name={}\n\
             Comment={}\n\
             Inherits={}\n",
            self.name, self.comment, self.inherits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_index_theme() {
        let text = IndexTheme::for_theme("Numix-HIDPI").render();
        assert_eq!(
            text,
            "[Icon Theme]\nName=Numix-HIDPI\nComment=Numix-HIDPI cursor theme\nInherits=hicolor\n"
        );
    }
}
