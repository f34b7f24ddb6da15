//! 数组列 JSON 结构体
//!
//! SQLite 没有数组类型，games 的 genres/developers 等字段与
//! user_games.platform_ids 以 JSON 文本存储。

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// 字符串数组（存储为 JSON）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// 忽略大小写判断是否包含某一项
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.iter().any(|item| item.eq_ignore_ascii_case(needle))
    }
}

impl Deref for StringList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for StringList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl From<Vec<&str>> for StringList {
    fn from(items: Vec<&str>) -> Self {
        Self(items.into_iter().map(str::to_string).collect())
    }
}

impl FromIterator<String> for StringList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 整数 ID 数组（存储为 JSON）
///
/// 用于 user_games.platform_ids，记录该副本所属的平台/DRM。
/// 不做外键约束，写入时按升序去重。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(transparent)]
pub struct IdList(pub Vec<i32>);

impl IdList {
    /// 排序并去重
    pub fn normalized(mut self) -> Self {
        self.0.sort_unstable();
        self.0.dedup();
        self
    }

    pub fn contains(&self, id: i32) -> bool {
        self.0.contains(&id)
    }

    /// 加入一个 ID，已存在时返回 false
    pub fn insert(&mut self, id: i32) -> bool {
        match self.0.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, id);
                true
            }
        }
    }

    pub fn remove(&mut self, id: i32) -> bool {
        match self.0.iter().position(|&x| x == id) {
            Some(pos) => {
                self.0.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl Deref for IdList {
    type Target = [i32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<i32>> for IdList {
    fn from(ids: Vec<i32>) -> Self {
        Self(ids).normalized()
    }
}
