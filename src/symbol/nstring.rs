
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::ops::Add;
use std::sync::{Mutex, OnceLock};

/// Used to manage String. Reduce allocation for String
#[derive(Default)]
struct StringManager {
  strings: Vec<&'static str>,
  string_map: HashMap<&'static str, usize>,
}

impl StringManager {
  fn get_string(&self, i: usize) -> &'static str {
    assert!(i < self.strings.len());
    self.strings[i]
  }

  fn get_id(&mut self, s: &str) -> usize {
    match self.string_map.get(s) {
      Some(id) => *id,
      None => {
        let owned: &'static str = Box::leak(s.to_string().into_boxed_str());
        self.strings.push(owned);
        let id = self.strings.len() - 1;
        self.string_map.insert(owned, id);
        id
      }
    }
  }
}

/// The global manager for String.
static STRING_M: OnceLock<Mutex<StringManager>> = OnceLock::new();

fn string_m() -> &'static Mutex<StringManager> {
  STRING_M.get_or_init(|| Mutex::new(StringManager::default()))
}

/// A wrapper for String. Copyable, hashes and compares as an id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NString(usize);

impl NString {
  pub fn as_str(&self) -> &'static str {
    string_m().lock().unwrap().get_string(self.0)
  }

  pub fn contains(&self, str: NString) -> bool {
    self.as_str().contains(str.as_str())
  }

  pub fn is_empty(&self) -> bool {
    self.as_str().is_empty()
  }
}

impl PartialEq<&str> for NString {
  fn eq(&self, other: &&str) -> bool {
    self.as_str() == *other
  }
}

impl Add for NString {
  type Output = Self;
  fn add(self, rhs: Self) -> Self {
    self + rhs.as_str()
  }
}

impl Add<String> for NString {
  type Output = Self;
  fn add(self, rhs: String) -> Self::Output {
    self + rhs.as_str()
  }
}

impl Add<&str> for NString {
  type Output = Self;
  fn add(self, rhs: &str) -> Self::Output {
    let new_string = self.as_str().to_string() + rhs;
    NString::from(new_string)
  }
}

impl Debug for NString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl Display for NString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl From<String> for NString {
  fn from(value: String) -> Self {
    NString(string_m().lock().unwrap().get_id(&value))
  }
}

impl From<&str> for NString {
  fn from(value: &str) -> Self {
    NString(string_m().lock().unwrap().get_id(value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_stable() {
    let a = NString::from("x");
    let b = NString::from("x".to_string());
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "x");
  }

  #[test]
  fn concat_interns() {
    let bb = NString::from("bb") + "0";
    assert_eq!(bb, "bb0");
    assert!(bb.contains(NString::from("b0")));
  }
}
