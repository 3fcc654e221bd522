//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Storyfront;

const DEFAULT_CONFIG: &str = r#"# storyfront configuration

# Site
title: My Blog
subtitle: Notes, tutorials and stories
description: ''
intro: Welcome! Browse the latest posts below, or save the ones you like to read later.
author: John Doe
language: en
root: /

# Content backend
cms:
  # storyblok | local
  provider: local
  api_url: https://api.storyblok.com/v2
  # Or pass --token / set STORYBLOK_TOKEN
  token: ''
  version: published
  posts_prefix: blog/
  profile_slug: profile
  timeout_secs: 30
  content_dir: content

home:
  limit: 6

archive:
  per_page: 5
  fetch_limit: 100

excerpt_length: 100

# Saved posts
storage:
  dir: .storyfront
  key: savedPostIds

highlight:
  theme: base16-ocean.dark
  line_number: true

server:
  ip: localhost
  port: 4000
"#;

const SAMPLE_PROFILE: &str = r#"name: John Doe
role: Software Engineer
bio: I write about the things I build.
skills:
  - Rust
  - TypeScript
experience:
  - title: Engineer
    company: Example Corp
    period: 2020 - present
    description: Building web services.
education:
  - degree: BSc Computer Science
    institution: Example University
    year: '2019'
contact:
  email: john@example.com
  github: https://github.com/example
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists, refusing to overwrite", config_path);
    }

    fs::create_dir_all(target_dir.join("content/blog"))?;
    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("content/profile.yml"), SAMPLE_PROFILE)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
id: hello-world
title: Hello World
date: {}
tags: [welcome]
---

Welcome to your new blog! This post lives in `content/blog/hello-world.md`.

## Quick Start

### Run the server

```bash
$ storyfront serve
```

### Switch to Storyblok

Set `cms.provider` to `storyblok` in `_config.yml` and pass your access token:

```bash
$ STORYBLOK_TOKEN=... storyfront serve
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(target_dir.join("content/blog/hello-world.md"), sample_post)?;

    Ok(())
}

/// Run the init command for an existing site directory
pub fn run(site: &Storyfront) -> Result<()> {
    init_site(&site.base_dir)
}
