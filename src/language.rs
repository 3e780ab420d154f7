use crate::policy::extension_of;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_LANGUAGE_TAGS: &[(&str, &str)] = &[
    (".gd", "gdscript"),
    (".rs", "rust"),
    (".toml", "toml"),
    (".lock", ""),
    (".md", "md"),
    (".h", "cpp"),
    (".hpp", "cpp"),
    (".c", "c"),
    (".cpp", "cpp"),
    (".cc", "cpp"),
    (".cxx", "cpp"),
    (".json", "json"),
    (".yml", "yaml"),
    (".yaml", "yaml"),
    (".js", "javascript"),
    (".ts", "typescript"),
    (".html", "html"),
    (".css", "css"),
    (".py", "python"),
    (".ps1", "powershell"),
    (".bat", "bat"),
    (".sh", "bash"),
    (".zsh", "bash"),
    (".tscn", ""),
    (".tres", ""),
    (".cfg", ""),
    (".ini", ""),
    (".shader", "glsl"),
    (".gdshader", "glsl"),
    (".import", ""),
    (".txt", ""),
    (".csv", ""),
    (".gitattributes", ""),
    (".gitignore", ""),
    (".editorconfig", ""),
];

/// Maps a file extension to the language label used on its code fence.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    tags: HashMap<String, String>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            tags: DEFAULT_LANGUAGE_TAGS
                .iter()
                .map(|(ext, tag)| ((*ext).to_string(), (*tag).to_string()))
                .collect(),
        }
    }
}

impl LanguageTable {
    /// Returns the fence label for `path`, or `None` when the fence stays untagged.
    #[must_use]
    pub fn tag_for(&self, path: &Path) -> Option<&str> {
        let ext = extension_of(path)?;
        self.tags
            .get(&ext)
            .map(String::as_str)
            .filter(|tag| !tag.is_empty())
    }
}
