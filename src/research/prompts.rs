//! Prompt templates for each pipeline phase.

use chrono::Utc;

/// Today's date as written into prompts, e.g. `Tue Oct 14, 2026`.
pub fn today() -> String {
    Utc::now().format("%a %b %-d, %Y").to_string()
}

pub fn clarify_with_user(transcript: &str) -> String {
    format!(
        r#"These are the messages exchanged so far with the user asking for the report:
<Messages>
{transcript}
</Messages>

Today's date is {date}.

Assess whether you need to ask a clarifying question, or if the user has already provided enough information for you to start research.
IMPORTANT: If you can see in the messages history that you have already asked a clarifying question, you almost always do not need to ask another one. Only ask another question if ABSOLUTELY NECESSARY.

If there are acronyms, abbreviations, or unknown terms, ask the user to clarify.
If you need to ask a question, follow these guidelines:
- Be concise while gathering all necessary information
- Gather all the information needed to carry out the research task in a concise, well-structured manner
- Use bullet points or numbered lists if appropriate for clarity
- Don't ask for unnecessary information, or information that the user has already provided

Respond with:
- "need_clarification": true and a "question" when a question is needed, with "verification" empty
- "need_clarification": false and a short "verification" message confirming you will start research, summarizing your understanding of the request, with "question" empty"#,
        transcript = transcript,
        date = today()
    )
}

pub fn research_brief(transcript: &str) -> String {
    format!(
        r#"You will be given the messages exchanged so far between yourself and the user.
Your job is to translate these messages into a more detailed and concrete research question that will be used to guide the research.

<Messages>
{transcript}
</Messages>

Today's date is {date}.

Guidelines:
1. Maximize specificity and detail
- Include all known user preferences and explicitly list key attributes or dimensions to consider.
- It is important that all details from the user are included in the instructions.

2. Fill in unstated but necessary dimensions as open-ended
- If certain attributes are essential for a meaningful output but the user has not provided them, explicitly state that they are open-ended or default to no specific constraint.

3. Avoid unwarranted assumptions
- If the user has not provided a particular detail, do not invent one.
- State the lack of specification and guide the researcher to treat it as flexible.

4. Use the first person
- Phrase the request from the perspective of the user.

5. Sources
- If specific sources should be prioritized, specify them in the research question.
- Prefer primary sources: official sites, original papers, and the user's language where relevant.

Return the brief as "research_brief"."#,
        transcript = transcript,
        date = today()
    )
}

pub fn supervisor_system(max_concurrent: usize, max_iterations: usize) -> String {
    format!(
        r#"You are a research supervisor. Your job is to plan research by delegating self-contained topics to research agents. Today's date is {date}.

<Task>
Decide whether the findings so far fully answer the research brief.
- If they do, set "is_complete" to true and return no tasks.
- Otherwise return the next research tasks.
</Task>

<Hard Limits>
- Bias towards a single task unless the brief clearly benefits from parallel research (e.g. comparisons of distinct items).
- At most {max_concurrent} tasks run per round; additional tasks are rejected and not executed.
- There are at most {max_iterations} research rounds in total.
- Stop when you can answer confidently; do not request more research than necessary.
</Hard Limits>

<Task Guidelines>
- Each task topic must be substantially different from the existing findings and from the other tasks.
- Write each topic as a standalone, detailed instruction: researchers cannot see the brief or other tasks.
- Do not use acronyms or abbreviations in topics.
- List the most important tasks first; only the first {max_concurrent} run this round.
- Give each task a short unique "id" and a "priority" (lower is more urgent).
</Task Guidelines>"#,
        date = today(),
        max_concurrent = max_concurrent,
        max_iterations = max_iterations
    )
}

pub fn supervisor_plan(brief: &str, findings: &[String], iteration: usize) -> String {
    let findings_block = if findings.is_empty() {
        "No findings yet.".to_string()
    } else {
        findings
            .iter()
            .enumerate()
            .map(|(i, f)| format!("<Finding {}>\n{}\n</Finding {}>", i + 1, f, i + 1))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        r#"<Research Brief>
{brief}
</Research Brief>

<Existing Findings>
{findings_block}
</Existing Findings>

This is research round {round}. Return your plan."#,
        brief = brief,
        findings_block = findings_block,
        round = iteration + 1
    )
}

pub fn researcher_system(tool_names: &[String], max_tool_calls: usize) -> String {
    format!(
        r#"You are a research assistant conducting research on the user's input topic. Today's date is {date}.

<Task>
Use the tools to gather information about the research topic.
Available tools: {tools}.
</Task>

<Instructions>
1. Read the question carefully and select the best tool for each step.
2. Start with broader searches, then narrow down to fill in gaps.
3. Use `think` after searches to assess what you found and what is missing.
4. Never call `ResearchComplete` without having done at least one research action first.
5. Do not narrate or reply with prose. Keep calling tools until you are satisfied, then call `ResearchComplete`.
</Instructions>

<Hard Limits>
- You have at most {max} tool-calling rounds.
- Stop once you can answer the question comprehensively, or the last searches returned similar information.
</Hard Limits>"#,
        date = today(),
        tools = tool_names.join(", "),
        max = max_tool_calls
    )
}

pub const COMPRESS_SYSTEM: &str = r#"You are a research assistant that has conducted research on a topic by calling several tools. Your job is to clean up the findings while preserving ALL of the relevant statements and information gathered.

<Task>
Clean up the information gathered from tool calls in the raw results.
All relevant information must be repeated and rewritten verbatim, in a cleaner format.
Do not summarize. Do not paraphrase. Only remove obviously irrelevant or duplicate text.
</Task>

<Output Format>
**List of Queries and Tool Calls Made**
**Fully Comprehensive Findings**
**List of All Relevant Sources (with citations in the report)**
</Output Format>

<Citation Rules>
- Assign each unique URL a single citation number in your text
- End with ### Sources that lists each source with corresponding numbers
- Number sources sequentially without gaps (1,2,3,4...)
- Example format:
  [1] Source Title: URL
  [2] Source Title: URL
</Citation Rules>

Critical reminder: any information not preserved here is lost to the final report, so keep every fact and every source URL."#;

pub fn compress_findings(topic: &str, tool_calls: &[String], raw_results: &str) -> String {
    format!(
        r#"<Research Topic>
{topic}
</Research Topic>

<Tool Calls Made>
{calls}
</Tool Calls Made>

<Raw Results>
{raw_results}
</Raw Results>

Today's date is {date}. Clean up these findings now. Do not summarize; preserve all relevant information verbatim."#,
        topic = topic,
        calls = tool_calls.join("\n"),
        raw_results = raw_results,
        date = today()
    )
}

pub const INSUFFICIENT_INFORMATION: &str =
    "The research did not gather sufficient information on this topic: no tool returned usable results.";

pub const FINAL_REPORT_SYSTEM: &str = "You are an expert research writer. You produce thorough, well-structured markdown reports grounded only in the provided findings.";

pub fn final_report(brief: &str, transcript: &str, findings: &[String]) -> String {
    format!(
        r#"Based on all the research conducted, create a comprehensive, well-structured answer to the overall research brief:
<Research Brief>
{brief}
</Research Brief>

For more context, here are all of the messages so far. Focus on the research brief above, but consider these messages as well.
<Messages>
{transcript}
</Messages>

CRITICAL: Write the answer in the same language as the human messages.

Today's date is {date}.

Here are the findings from the research that you conducted:
<Findings>
{findings}
</Findings>

Please create a detailed answer to the overall research brief that:
1. Is well-organized with proper headings (# for title, ## for sections, ### for subsections)
2. Includes specific facts and insights from the research
3. References relevant sources using [Title](URL) format
4. Provides a balanced, thorough analysis
5. Includes a "Sources" section at the end with all referenced links

<Citation Rules>
- Assign each unique URL a single citation number in your text
- End with ### Sources that lists each source with corresponding numbers
- IMPORTANT: Number sources sequentially without gaps (1,2,3,4...) in the final list regardless of which sources you choose
- Each source should be a separate line item in a list
- Example format:
  [1] Source Title: URL
  [2] Source Title: URL
- Citations are extremely important. Make sure to include these, and pay attention to getting them right.
</Citation Rules>"#,
        brief = brief,
        transcript = transcript,
        date = today(),
        findings = findings.join("\n\n")
    )
}
