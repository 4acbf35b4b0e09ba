use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: &'static str,
    pub title: &'static str,
    pub location: &'static str,
    pub email: &'static str,
    pub summary: &'static str,
    pub experience: &'static [Position],
    pub projects: &'static [Project],
    pub skills: &'static [&'static str],
    pub education: &'static [Education],
}

#[derive(Debug, Serialize)]
pub struct Position {
    pub company: &'static str,
    pub role: &'static str,
    pub duration: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Project {
    pub name: &'static str,
    pub tech: &'static [&'static str],
    pub description: &'static str,
    pub url: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct Education {
    pub degree: &'static str,
    pub focus: &'static str,
}

pub static PROFILE: Profile = Profile {
    name: "Shivam Yadav",
    title: "Full-Stack Developer & MCA Graduate",
    location: "Agra, Uttar Pradesh, India",
    email: "shivamydv.work@gmail.com",
    summary: "Recent MCA graduate with internship experience in data science and analytics, \
              working across React, Node.js, Python and machine learning.",
    experience: &[
        Position {
            company: "Truly Virtually",
            role: "Frontend Developer",
            duration: "January 2025 - June 2025",
            description: "Responsive user interfaces, performance and accessibility work",
        },
        Position {
            company: "YBI Foundation",
            role: "Data Science and Machine Learning Intern",
            duration: "June 2024 - August 2024",
            description: "Data preprocessing, model development and predictive analytics",
        },
        Position {
            company: "Accenture",
            role: "Data Analytics and Visualization Intern",
            duration: "April 2024 - May 2024",
            description: "Interactive dashboards and business intelligence reporting",
        },
    ],
    projects: &[
        Project {
            name: "Hotel Management System",
            tech: &["React", "Node.js", "MongoDB", "Express.js", "JWT", "Stripe"],
            description: "Room booking, guest and staff management, billing and payments",
            url: Some("https://kutkuthotel.me/"),
        },
        Project {
            name: "Gesture-Controlled Media Player",
            tech: &["React", "Python", "OpenCV", "MediaPipe", "TensorFlow"],
            description: "Media playback driven by real-time hand gesture recognition",
            url: Some("https://gesturecontroll.netlify.app/"),
        },
        Project {
            name: "AI Image Enhancer",
            tech: &["React", "Python", "TensorFlow", "OpenCV"],
            description: "Deep-learning image enhancement and super-resolution",
            url: Some("https://image-enhanced.vercel.app"),
        },
        Project {
            name: "MkCaters",
            tech: &["React", "Node.js", "MongoDB", "TypeScript", "Stripe"],
            description: "Catering business site with ordering and menu management",
            url: None,
        },
    ],
    skills: &[
        "React", "JavaScript", "TypeScript", "HTML5", "CSS3", "Tailwind CSS", "Node.js",
        "Express.js", "Python", "MongoDB", "MySQL", "TensorFlow", "OpenCV", "MediaPipe",
        "Scikit-learn", "Git", "Vercel", "Netlify",
    ],
    education: &[Education {
        degree: "Master of Computer Applications (MCA)",
        focus: "Software engineering, databases, machine learning, algorithms, web technologies",
    }],
};

// System instruction for the external model, first person as the owner
pub fn system_prompt() -> String {
    let profile = serde_json::to_string_pretty(&PROFILE).unwrap_or_default();
    format!(
        "You are {name}, a {title}. You are personally answering visitors on your portfolio website.\n\
         \n\
         Guidelines:\n\
         1. Speak in the first person (\"I built\", \"my experience\"), never in the third person.\n\
         2. Be friendly, enthusiastic and professional.\n\
         3. Only discuss your professional background, skills, projects, education and experience.\n\
         4. Politely steer unrelated questions back to your work.\n\
         \n\
         Your information:\n\
         {profile}",
        name = PROFILE.name,
        title = PROFILE.title,
    )
}

/// Keyword groups, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Projects,
    Skills,
    Experience,
    Contact,
    Education,
    About,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::Greeting,
        Topic::Projects,
        Topic::Skills,
        Topic::Experience,
        Topic::Contact,
        Topic::Education,
        Topic::About,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Greeting => &["hello", "hi", "hey", "good"],
            Topic::Projects => &["project", "work", "built", "created"],
            Topic::Skills => &["skill", "technology", "tech", "language", "framework"],
            Topic::Experience => &["experience", "background", "career", "internship", "job"],
            Topic::Contact => &["contact", "email", "reach", "hire", "available"],
            Topic::Education => &["education", "degree", "study", "university", "college"],
            Topic::About => &["about", "who", "tell me", "shivam"],
        }
    }

    // Analytics label
    pub fn intent(&self) -> &'static str {
        match self {
            Topic::Greeting => "greeting",
            Topic::Projects => "projects",
            Topic::Skills => "skills",
            Topic::Experience => "experience",
            Topic::Contact => "contact",
            Topic::Education => "education",
            Topic::About => "about",
        }
    }

    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            Topic::Greeting => GREETING_REPLIES,
            Topic::Projects => PROJECT_REPLIES,
            Topic::Skills => SKILL_REPLIES,
            Topic::Experience => EXPERIENCE_REPLIES,
            Topic::Contact => CONTACT_REPLIES,
            Topic::Education => EDUCATION_REPLIES,
            Topic::About => ABOUT_REPLIES,
        }
    }

    /// First group with a keyword contained in `lowered`.
    pub fn detect(lowered: &str) -> Option<Topic> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.keywords().iter().any(|kw| lowered.contains(kw)))
    }
}

const GREETING_REPLIES: &[&str] = &[
    "Hello! Welcome to my portfolio. I'm **Shivam Yadav**, and I'd love to walk you through my \
     full-stack projects, my machine learning work or my professional journey. Where would you \
     like to start?",
    "Hi there, great to meet you! I'm **Shivam**, a Full-Stack Developer and recent MCA graduate. \
     I've built everything from a hotel management platform to a gesture-controlled media player. \
     What interests you most?",
    "Hey, thanks for stopping by! I'm **Shivam** and I enjoy mixing solid engineering with creative \
     problem-solving, from React front ends to computer vision models. What would you like to explore?",
];

const PROJECT_REPLIES: &[&str] = &[
    "Here are a few projects I'm proud of:\n\n\
     **Hotel Management System** - React, Node.js and MongoDB, with room booking, guest and staff \
     management, automated billing and Stripe payments. [kutkuthotel.me](https://kutkuthotel.me/)\n\n\
     **Gesture-Controlled Media Player** - React, Python, OpenCV and MediaPipe. You control playback \
     with hand gestures recognised in real time. \
     [gesturecontroll.netlify.app](https://gesturecontroll.netlify.app/)\n\n\
     **AI Image Enhancer** - deep-learning models that sharpen and upscale images.\n\n\
     **MkCaters** - a full-stack catering site focused on clean, responsive design.\n\n\
     Which one should I tell you more about?",
    "My projects cover quite a range. The **Hotel Management System** is my most complete web \
     platform, the **Gesture-Controlled Media Player** is where I dug into computer vision, and the \
     **AI Image Enhancer** is my deepest machine learning build. Ask me about any of them!",
];

const SKILL_REPLIES: &[&str] = &[
    "My toolkit in short:\n\n\
     **Frontend:** React, JavaScript (ES6+), TypeScript, HTML5, CSS3, Tailwind CSS\n\
     **Backend:** Node.js, Express.js, Python, REST APIs with JWT auth and rate limiting\n\
     **Databases:** MongoDB, MySQL\n\
     **AI/ML:** TensorFlow, OpenCV, MediaPipe, Scikit-learn\n\
     **Tooling:** Git, GitHub, Vercel, Netlify\n\n\
     Is there a particular technology you'd like to hear about?",
    "I'm most at home with **React** on the front end and **Node.js** or **Python** on the back \
     end, and I bring in **TensorFlow** and **OpenCV** whenever a project needs machine learning \
     or computer vision. My MCA gave me the theory to back that up.",
];

const EXPERIENCE_REPLIES: &[&str] = &[
    "Here's my journey so far:\n\n\
     **Frontend Developer, Truly Virtually** (Jan 2025 - Jun 2025) - responsive interfaces, \
     performance and accessibility.\n\
     **Data Science & ML Intern, YBI Foundation** (Jun 2024 - Aug 2024) - preprocessing, model \
     development and predictive analytics.\n\
     **Data Analytics & Visualization Intern, Accenture** (Apr 2024 - May 2024) - dashboards and \
     business intelligence.\n\n\
     Alongside that I completed my MCA. What would you like to know more about?",
    "I've worked as a frontend developer and interned in both data science and analytics, so I'm \
     comfortable moving between UI work, backend services and data pipelines. I enjoy taking \
     projects from idea all the way to deployment.",
];

const CONTACT_REPLIES: &[&str] = &[
    "I'm actively looking for new opportunities and would love to connect!\n\n\
     **Email:** [shivamydv.work@gmail.com](mailto:shivamydv.work@gmail.com)\n\
     **Location:** Agra, Uttar Pradesh, India\n\n\
     I'm open to full-time roles, freelance full-stack or ML projects and interesting \
     collaborations. Don't hesitate to reach out!",
    "The best way to reach me is by email at \
     [shivamydv.work@gmail.com](mailto:shivamydv.work@gmail.com). I'm available for full-time \
     positions as well as freelance and collaborative projects.",
];

const EDUCATION_REPLIES: &[&str] = &[
    "I recently completed my **Master of Computer Applications (MCA)**, covering advanced \
     programming, software engineering, database systems, machine learning, data structures and \
     algorithms and web technologies. It pairs nicely with the hands-on experience from my \
     internships and personal projects.",
];

const ABOUT_REPLIES: &[&str] = &[
    "Let me introduce myself! I'm Shivam Yadav, a **Full-Stack Developer and recent MCA graduate** \
     from Agra, India. I'm comfortable on both the frontend and backend, I love bringing machine \
     learning into practical applications, and I'm always picking up new tools. My work ranges from \
     hotel management systems to gesture-controlled media players.",
    "I'm Shivam, a developer who enjoys building things that are useful and a little bit fun. \
     I work mostly with React, Node.js and Python, with a soft spot for computer vision. Ask me \
     about my projects, skills or experience!",
];

pub const GENERIC_REPLIES: &[&str] = &[
    "That's a great question! I can tell you about my full-stack development work, my projects, or \
     my experience in data science and machine learning. What would you like to explore?",
    "I'm happy to share my professional background! Would you like to hear about:\n\
     - My projects\n\
     - My technical skills\n\
     - My work experience\n\
     - How to contact me",
    "Thanks for your interest in my work! I've built some fun projects and have experience in both \
     development and data science. Just let me know which area interests you most.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_has_replies() {
        for topic in Topic::ALL {
            assert!(!topic.replies().is_empty(), "{topic:?}");
            assert!(!topic.keywords().is_empty(), "{topic:?}");
        }
    }

    #[test]
    fn detection_follows_group_order() {
        // "hi" appears inside "this", so greeting wins over projects
        assert_eq!(Topic::detect("this project"), Some(Topic::Greeting));
        assert_eq!(Topic::detect("tell me about your projects"), Some(Topic::Projects));
        assert_eq!(Topic::detect("what degree do you have"), Some(Topic::Education));
        assert_eq!(Topic::detect("xyz"), None);
    }

    #[test]
    fn system_prompt_carries_profile() {
        let prompt = system_prompt();
        assert!(prompt.contains("Shivam Yadav"));
        assert!(prompt.contains("Gesture-Controlled Media Player"));
        assert!(prompt.contains("first person"));
    }
}
